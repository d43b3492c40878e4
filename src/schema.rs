//! The table of keywords a `.mtl` field line may start with.
//!
//! Each [`FieldSpec`] names a keyword, the material field it writes
//! ([`Key`]), the option modifiers it accepts, and an ordered list of value
//! shapes. Shapes are tried in declaration order and the first whose
//! qualifier matches wins, so a bare shape must come last.
//!
//! Tables are plain `'static` data and never change once built, so one
//! [`Schema`] can be shared by any number of parses on any number of threads.

use crate::material::Channel;

/// The keyword that opens a new material.
pub const BOUNDARY_KEYWORD: &str = "newmtl";

/// Which material field a keyword writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Key {
  Ambient,
  Diffuse,
  Specular,
  TransmissionFilter,
  Illumination,
  Dissolve,
  SpecularExponent,
  Sharpness,
  OpticalDensity,
  AmbientMap,
  DiffuseMap,
  SpecularMap,
  SpecularExponentMap,
  AntiAliasing,
  Decal,
  Displacement,
}

impl Key {
  /// The `-imfchan` default for map keys.
  pub fn default_channel(self) -> Channel {
    match self {
      Key::Decal => Channel::M,
      _ => Channel::L,
    }
  }
}

/// The scalar layout of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
  /// One float.
  Float,
  /// One integer.
  Int,
  /// Three floats.
  Float3,
  /// `on` or `off`.
  Switch,
  /// A file name followed by an optional float factor.
  Spectral,
  /// The rest of the line, as a file name.
  Path,
}

/// One accepted shape of a keyword's value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueShape {
  /// A literal word that must precede the value, such as `xyz`. A shape
  /// without one always matches.
  pub qualifier: Option<&'static str>,
  /// What follows the qualifier.
  pub layout: Layout,
}

impl ValueShape {
  /// A shape without a qualifier.
  pub const fn bare(layout: Layout) -> ValueShape {
    ValueShape {
      qualifier: None,
      layout,
    }
  }

  /// A shape gated by a literal word.
  pub const fn qualified(qualifier: &'static str, layout: Layout) -> ValueShape {
    ValueShape {
      qualifier: Some(qualifier),
      layout,
    }
  }
}

/// An option modifier that may sit between a keyword and its value. The
/// modifier determines what arguments follow it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
  /// `-halo`, no argument.
  Halo,
  /// `-blendu on|off`
  BlendU,
  /// `-blendv on|off`
  BlendV,
  /// `-boost f`
  Boost,
  /// `-cc on|off`
  ColorCorrection,
  /// `-clamp on|off`
  Clamp,
  /// `-imfchan r|g|b|m|l|z`
  Channel,
  /// `-mm base gain`
  BaseGain,
  /// `-o u [v [w]]`
  Offset,
  /// `-s u [v [w]]`
  Scale,
  /// `-t u [v [w]]`
  Turbulence,
  /// `-texres n` or `-texres WxH`
  Resolution,
}

/// An option modifier accepted by a keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionSpec {
  /// The flag as written, e.g. `-halo`.
  pub flag: &'static str,
  #[allow(missing_docs)]
  pub modifier: Modifier,
}

/// A recognized keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
  /// The keyword as written at the start of a line.
  pub keyword: &'static str,
  #[allow(missing_docs)]
  pub key: Key,
  /// Option modifiers, recognized in any order.
  pub options: &'static [OptionSpec],
  /// Value shapes, tried in order.
  pub shapes: &'static [ValueShape],
}

const fn opt(flag: &'static str, modifier: Modifier) -> OptionSpec {
  OptionSpec { flag, modifier }
}

const COLOR_SHAPES: &[ValueShape] = &[
  ValueShape::qualified("xyz", Layout::Float3),
  ValueShape::qualified("spectral", Layout::Spectral),
  ValueShape::bare(Layout::Float3),
];

const FLOAT_SHAPE: &[ValueShape] = &[ValueShape::bare(Layout::Float)];
const INT_SHAPE: &[ValueShape] = &[ValueShape::bare(Layout::Int)];
const PATH_SHAPE: &[ValueShape] = &[ValueShape::bare(Layout::Path)];
const SWITCH_SHAPE: &[ValueShape] = &[ValueShape::bare(Layout::Switch)];

const DISSOLVE_OPTIONS: &[OptionSpec] = &[opt("-halo", Modifier::Halo)];

const COLOR_MAP_OPTIONS: &[OptionSpec] = &[
  opt("-blendu", Modifier::BlendU),
  opt("-blendv", Modifier::BlendV),
  opt("-boost", Modifier::Boost),
  opt("-cc", Modifier::ColorCorrection),
  opt("-clamp", Modifier::Clamp),
  opt("-mm", Modifier::BaseGain),
  opt("-o", Modifier::Offset),
  opt("-s", Modifier::Scale),
  opt("-t", Modifier::Turbulence),
  opt("-texres", Modifier::Resolution),
];

const SCALAR_MAP_OPTIONS: &[OptionSpec] = &[
  opt("-blendu", Modifier::BlendU),
  opt("-blendv", Modifier::BlendV),
  opt("-boost", Modifier::Boost),
  opt("-clamp", Modifier::Clamp),
  opt("-imfchan", Modifier::Channel),
  opt("-mm", Modifier::BaseGain),
  opt("-o", Modifier::Offset),
  opt("-s", Modifier::Scale),
  opt("-t", Modifier::Turbulence),
  opt("-texres", Modifier::Resolution),
];

const fn field(
  keyword: &'static str,
  key: Key,
  options: &'static [OptionSpec],
  shapes: &'static [ValueShape],
) -> FieldSpec {
  FieldSpec {
    keyword,
    key,
    options,
    shapes,
  }
}

const STANDARD: &[FieldSpec] = &[
  field("Ka", Key::Ambient, &[], COLOR_SHAPES),
  field("Kd", Key::Diffuse, &[], COLOR_SHAPES),
  field("Ks", Key::Specular, &[], COLOR_SHAPES),
  field("Tf", Key::TransmissionFilter, &[], COLOR_SHAPES),
  field("illum", Key::Illumination, &[], INT_SHAPE),
  field("d", Key::Dissolve, DISSOLVE_OPTIONS, FLOAT_SHAPE),
  field("Ns", Key::SpecularExponent, &[], FLOAT_SHAPE),
  field("sharpness", Key::Sharpness, &[], FLOAT_SHAPE),
  field("Ni", Key::OpticalDensity, &[], FLOAT_SHAPE),
  field("map_Ka", Key::AmbientMap, COLOR_MAP_OPTIONS, PATH_SHAPE),
  field("map_Kd", Key::DiffuseMap, COLOR_MAP_OPTIONS, PATH_SHAPE),
  field("map_Ks", Key::SpecularMap, COLOR_MAP_OPTIONS, PATH_SHAPE),
  field("map_Ns", Key::SpecularExponentMap, SCALAR_MAP_OPTIONS, PATH_SHAPE),
  field("map_aat", Key::AntiAliasing, &[], SWITCH_SHAPE),
  field("decal", Key::Decal, SCALAR_MAP_OPTIONS, PATH_SHAPE),
  field("disp", Key::Displacement, SCALAR_MAP_OPTIONS, PATH_SHAPE),
];

/// An immutable keyword table.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
  entries: &'static [FieldSpec],
}

impl Schema {
  /// A table of custom entries, matched in the given order.
  pub const fn new(entries: &'static [FieldSpec]) -> Schema {
    Schema { entries }
  }

  /// The keywords of the `.mtl` format understood by this crate.
  pub const fn standard() -> Schema {
    Schema::new(STANDARD)
  }

  #[allow(missing_docs)]
  pub fn entries(&self) -> &'static [FieldSpec] {
    self.entries
  }

  /// The entry for a keyword, by exact text.
  pub fn get(&self, keyword: &str) -> Option<&'static FieldSpec> {
    self.entries.iter().find(|e| e.keyword == keyword)
  }
}

impl Default for Schema {
  fn default() -> Schema {
    Schema::standard()
  }
}

#[test]
fn test_standard_keywords() {
  let schema = Schema::standard();
  for keyword in &[
    "Ka", "Kd", "Ks", "Tf", "illum", "d", "Ns", "sharpness", "Ni", "map_Ka", "map_Kd", "map_Ks",
    "map_Ns", "map_aat", "decal", "disp",
  ] {
    assert!(schema.get(keyword).is_some(), "missing {}", keyword);
  }
  assert!(schema.get(BOUNDARY_KEYWORD).is_none());
  assert!(schema.get("bump").is_none());
}

#[test]
fn test_bare_shapes_come_last() {
  for entry in Schema::standard().entries() {
    let bare = entry
      .shapes
      .iter()
      .position(|s| s.qualifier.is_none());
    assert_eq!(bare, Some(entry.shapes.len() - 1), "{}", entry.keyword);
  }
}

#[test]
fn test_options_are_flags() {
  for entry in Schema::standard().entries() {
    assert!(entry.options.iter().all(|o| o.flag.starts_with('-')));
  }
  assert_eq!(
    Schema::standard().get("d").map(|e| e.options),
    Some(DISSOLVE_OPTIONS)
  );
}
