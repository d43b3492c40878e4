//! Matching one field line against a [`Schema`] and writing the result into
//! a [`Material`].
//!
//! A line goes through four steps: the keyword is matched (first table entry
//! wins, and the keyword must end at whitespace), a value shape is picked
//! (first matching qualifier wins), option modifiers are consumed, and the
//! value is read. Only when all of that succeeds is the material touched.
use log::trace;

use crate::lex::{Cursor, ErrorKind, ValueError};
use crate::material::{Channel, Color, Map, Material, Spectral};
use crate::schema::{FieldSpec, Key, Layout, Modifier, Schema, ValueShape};

/// Upper bound on option modifiers read from one line. A line with more is
/// rejected.
const MAX_OPTIONS: usize = 32;

/// The argument read after an option modifier.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
  /// A modifier without an argument.
  Flag,
  /// `on` or `off`.
  Switch(bool),
  #[allow(missing_docs)]
  Float(f64),
  /// Two floats, as for `-mm`.
  Pair(f64, f64),
  /// One to three floats, as for `-o`. Only the first `count` are read.
  Floats {
    #[allow(missing_docs)]
    values: [f64; 3],
    #[allow(missing_docs)]
    count: usize,
  },
  #[allow(missing_docs)]
  Channel(Channel),
  /// Width and height.
  Resolution(u32, u32),
}

/// A field's value, tagged by its layout.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Value {
  Float(f64),
  Int(i32),
  Float3([f64; 3]),
  Switch(bool),
  Spectral(Spectral),
  Path(String),
}

impl Value {
  fn as_float(&self) -> Option<f64> {
    match *self {
      Value::Float(v) => Some(v),
      Value::Int(v) => Some(f64::from(v)),
      _ => None,
    }
  }
}

/// A fully read field line.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
  /// The schema entry the line matched.
  pub spec: &'static FieldSpec,
  /// The shape that was selected.
  pub shape: ValueShape,
  /// Option modifiers, in the order they appeared.
  pub options: Vec<(Modifier, OptionValue)>,
  #[allow(missing_docs)]
  pub value: Value,
}

/// What happened to a line.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
  /// No keyword matched. Not an error.
  Unrecognized,
  /// The field was written.
  Applied(Key),
  /// A keyword matched but its field was left alone.
  Rejected(ErrorKind),
}

impl Outcome {
  /// Whether a keyword matched, regardless of whether its value parsed.
  pub fn is_recognized(&self) -> bool {
    *self != Outcome::Unrecognized
  }
}

/// Recognizes field lines against a schema.
#[derive(Clone, Copy, Debug)]
pub struct Recognizer<'s> {
  schema: &'s Schema,
}

impl<'s> Recognizer<'s> {
  #[allow(missing_docs)]
  pub fn new(schema: &'s Schema) -> Recognizer<'s> {
    Recognizer { schema }
  }

  /// Skips leading punctuation and consumes the first keyword of the
  /// schema that starts the line.
  fn match_keyword(&self, cursor: &mut Cursor) -> Option<&'static FieldSpec> {
    cursor.skip_optional_chars();
    let spec = self
      .schema
      .entries()
      .iter()
      .find(|e| cursor.starts_with_word(e.keyword))?;
    cursor.eat_word(spec.keyword);
    Some(spec)
  }

  /// Reads a line without applying it. `None` if no keyword matched.
  pub fn read_field(
    &self,
    line: &str,
  ) -> Option<Result<Field, (&'static FieldSpec, ValueError)>> {
    let mut cursor = Cursor::new(line);
    let spec = self.match_keyword(&mut cursor)?;
    trace!("matched key {}", spec.keyword);
    Some(read_value(&mut cursor, spec).map_err(|e| (spec, e)))
  }

  /// Recognizes `line` and, if its value reads cleanly, writes it into
  /// `material`.
  pub fn recognize(&self, line: &str, material: &mut Material) -> Outcome {
    match self.read_field(line) {
      None => Outcome::Unrecognized,
      Some(Err((spec, error))) => Outcome::Rejected(ErrorKind::Field {
        keyword: spec.keyword,
        material: material.name.clone(),
        error,
      }),
      Some(Ok(field)) => match apply(material, &field) {
        Ok(()) => Outcome::Applied(field.spec.key),
        Err(kind) => Outcome::Rejected(kind),
      },
    }
  }
}

fn read_value(cursor: &mut Cursor, spec: &'static FieldSpec) -> Result<Field, ValueError> {
  cursor.skip_optional_chars();
  let column = cursor.position();
  let shape = *spec
    .shapes
    .iter()
    .find(|s| match s.qualifier {
      None => true,
      Some(q) => cursor.starts_with_word(q),
    })
    .ok_or(ValueError::UnexpectedWord {
      column,
      expected: "a qualifier declared for this keyword",
    })?;
  if let Some(q) = shape.qualifier {
    cursor.eat_word(q);
  }

  let options = read_options(cursor, spec)?;

  let value = match shape.layout {
    Layout::Float => Value::Float(cursor.read_float()?),
    Layout::Int => Value::Int(cursor.read_int()?),
    Layout::Float3 => Value::Float3(cursor.read_float3()?),
    Layout::Switch => Value::Switch(cursor.read_switch()?),
    Layout::Spectral => {
      let file = cursor.read_token()?.to_owned();
      let factor = if cursor.at_comment_or_end() {
        1.0
      } else {
        cursor.read_float()?
      };
      Value::Spectral(Spectral { file, factor })
    }
    Layout::Path => Value::Path(cursor.read_rest()?.to_owned()),
  };

  Ok(Field {
    spec,
    shape,
    options,
    value,
  })
}

fn read_options(
  cursor: &mut Cursor,
  spec: &FieldSpec,
) -> Result<Vec<(Modifier, OptionValue)>, ValueError> {
  let mut options = Vec::new();
  loop {
    // Look ahead on a copy so the value reader still sees any opening quote.
    let mut ahead = cursor.clone();
    ahead.skip_optional_chars();
    let option = match spec.options.iter().find(|o| ahead.starts_with_word(o.flag)) {
      Some(option) => option,
      None => return Ok(options),
    };
    if options.len() == MAX_OPTIONS {
      return Err(ValueError::TooManyOptions {
        column: ahead.position(),
        limit: MAX_OPTIONS,
      });
    }
    ahead.eat_word(option.flag);
    *cursor = ahead;
    options.push((option.modifier, read_option_arg(cursor, option.modifier)?));
  }
}

fn read_option_arg(cursor: &mut Cursor, modifier: Modifier) -> Result<OptionValue, ValueError> {
  Ok(match modifier {
    Modifier::Halo => OptionValue::Flag,
    Modifier::BlendU | Modifier::BlendV | Modifier::ColorCorrection | Modifier::Clamp => {
      OptionValue::Switch(cursor.read_switch()?)
    }
    Modifier::Boost => OptionValue::Float(cursor.read_float()?),
    Modifier::Channel => {
      cursor.skip_optional_chars();
      let column = cursor.position();
      let symbol = cursor.read_word()?;
      let channel = Channel::from_symbol(symbol).ok_or(ValueError::UnexpectedWord {
        column,
        expected: "r, g, b, m, l, z",
      })?;
      OptionValue::Channel(channel)
    }
    Modifier::BaseGain => {
      let base = cursor.read_float()?;
      OptionValue::Pair(base, cursor.read_float()?)
    }
    Modifier::Offset | Modifier::Scale | Modifier::Turbulence => {
      let mut values = [cursor.read_float()?, 0.0, 0.0];
      let mut count = 1;
      while count < 3 {
        match cursor.try_float_token() {
          Some(v) => values[count] = v,
          None => break,
        }
        count += 1;
      }
      OptionValue::Floats { values, count }
    }
    Modifier::Resolution => {
      cursor.skip_optional_chars();
      let column = cursor.position();
      let word = cursor.read_word()?;
      let malformed = ValueError::MalformedNumber { column };
      let mut dims = word.splitn(2, 'x').map(lexical::parse::<u32, _>);
      let width = match dims.next() {
        Some(Ok(w)) => w,
        _ => return Err(malformed),
      };
      let height = match dims.next() {
        None => width,
        Some(Ok(h)) => h,
        Some(Err(_)) => return Err(malformed),
      };
      OptionValue::Resolution(width, height)
    }
  })
}

fn color_slots(
  material: &mut Material,
  key: Key,
) -> Option<(&mut Color, &mut Option<Spectral>)> {
  match key {
    Key::Ambient => Some((&mut material.ambient, &mut material.ambient_spectral)),
    Key::Diffuse => Some((&mut material.diffuse, &mut material.diffuse_spectral)),
    Key::Specular => Some((&mut material.specular, &mut material.specular_spectral)),
    Key::TransmissionFilter => Some((
      &mut material.transmission_filter,
      &mut material.transmission_filter_spectral,
    )),
    _ => None,
  }
}

fn map_slot(material: &mut Material, key: Key) -> Option<&mut Map> {
  match key {
    Key::AmbientMap => Some(&mut material.ambient_map),
    Key::DiffuseMap => Some(&mut material.diffuse_map),
    Key::SpecularMap => Some(&mut material.specular_map),
    Key::SpecularExponentMap => Some(&mut material.specular_exponent_map),
    Key::Decal => Some(&mut material.decal),
    Key::Displacement => Some(&mut material.displacement),
    _ => None,
  }
}

/// Returns false if the modifier doesn't apply to maps.
fn apply_map_option(map: &mut Map, modifier: Modifier, value: &OptionValue) -> bool {
  match (modifier, value) {
    (Modifier::BlendU, &OptionValue::Switch(on)) => map.blend_u = on,
    (Modifier::BlendV, &OptionValue::Switch(on)) => map.blend_v = on,
    (Modifier::ColorCorrection, &OptionValue::Switch(on)) => map.color_correction = on,
    (Modifier::Clamp, &OptionValue::Switch(on)) => map.clamp = on,
    (Modifier::Boost, &OptionValue::Float(v)) => map.boost = Some(v),
    (Modifier::Channel, &OptionValue::Channel(c)) => map.channel = c,
    (Modifier::BaseGain, &OptionValue::Pair(base, gain)) => map.base_gain = (base, gain),
    (Modifier::Offset, &OptionValue::Floats { values, count }) => {
      map.offset[..count].copy_from_slice(&values[..count])
    }
    (Modifier::Scale, &OptionValue::Floats { values, count }) => {
      map.scale[..count].copy_from_slice(&values[..count])
    }
    (Modifier::Turbulence, &OptionValue::Floats { values, count }) => {
      map.turbulence[..count].copy_from_slice(&values[..count])
    }
    (Modifier::Resolution, &OptionValue::Resolution(w, h)) => map.resolution = Some((w, h)),
    _ => return false,
  }
  true
}

/// Writes a read field into the material it belongs to. Nothing is written
/// if any part of the field has no place in the material.
fn apply(material: &mut Material, field: &Field) -> Result<(), ErrorKind> {
  let keyword = field.spec.keyword;
  let key = field.spec.key;
  let unmapped = |what: String| ErrorKind::Unmapped { keyword, what };

  if let Some(slot) = map_slot(material, key) {
    let path = match field.value {
      Value::Path(ref path) => path,
      ref other => return Err(unmapped(format!("value {:?}", other))),
    };
    let mut map = slot.cleared(key.default_channel());
    for (modifier, value) in &field.options {
      if !apply_map_option(&mut map, *modifier, value) {
        return Err(unmapped(format!("modifier {:?}", modifier)));
      }
    }
    map.file = Some(path.clone());
    *slot = map;
    return Ok(());
  }

  let mut halo = false;
  for (modifier, _) in &field.options {
    match (key, modifier) {
      (Key::Dissolve, Modifier::Halo) => halo = true,
      _ => return Err(unmapped(format!("modifier {:?}", modifier))),
    }
  }

  if let Some((color, spectral)) = color_slots(material, key) {
    match field.value {
      Value::Float3(v) => *color = Color::from(v),
      Value::Spectral(ref s) => *spectral = Some(s.clone()),
      ref other => return Err(unmapped(format!("value {:?}", other))),
    }
    return Ok(());
  }

  match (key, &field.value, field.value.as_float()) {
    (Key::Illumination, &Value::Int(v), _) => material.illumination = v,
    (Key::AntiAliasing, &Value::Switch(on), _) => material.anti_aliasing = on,
    (Key::Dissolve, _, Some(v)) => {
      material.dissolve = v;
      material.dissolve_halo = halo;
    }
    (Key::SpecularExponent, _, Some(v)) => material.specular_exponent = v,
    (Key::Sharpness, _, Some(v)) => material.sharpness = v,
    (Key::OpticalDensity, _, Some(v)) => material.optical_density = v,
    (_, other, _) => return Err(unmapped(format!("value {:?}", other))),
  }
  Ok(())
}

#[cfg(test)]
fn recognize_standard(line: &str, material: &mut Material) -> Outcome {
  Recognizer::new(&Schema::standard()).recognize(line, material)
}

#[test]
fn test_colors() {
  let mut m = Material::new("m");
  let lines = [
    ("Ka 0.1 0.2 0.3", Key::Ambient),
    ("  Kd\t0.4 0.5 0.6", Key::Diffuse),
    ("Ks xyz 1 2 3", Key::Specular),
    ("Tf '0.5' \"0.5\" 0.5", Key::TransmissionFilter),
  ];
  for (line, key) in lines {
    assert_eq!(recognize_standard(line, &mut m), Outcome::Applied(key));
  }

  assert_eq!(m.ambient, Color { r: 0.1, g: 0.2, b: 0.3 });
  assert_eq!(m.diffuse, Color { r: 0.4, g: 0.5, b: 0.6 });
  assert_eq!(m.specular, Color { r: 1.0, g: 2.0, b: 3.0 });
  assert_eq!(m.transmission_filter, Color { r: 0.5, g: 0.5, b: 0.5 });
}

#[test]
fn test_spectral() {
  let mut m = Material::new("m");
  recognize_standard("Kd spectral wood.rfl 0.8", &mut m);
  recognize_standard("Ka spectral sky.rfl", &mut m);

  assert_eq!(
    m.diffuse_spectral,
    Some(Spectral { file: "wood.rfl".to_owned(), factor: 0.8 })
  );
  assert_eq!(
    m.ambient_spectral,
    Some(Spectral { file: "sky.rfl".to_owned(), factor: 1.0 })
  );
  assert_eq!(m.diffuse, Color::default());
}

#[test]
fn test_spectral_quoted_file() {
  let mut m = Material::new("m");
  let outcome = recognize_standard("Kd spectral \"my wood.rfl\" 0.5", &mut m);
  assert_eq!(outcome, Outcome::Applied(Key::Diffuse));
  assert_eq!(
    m.diffuse_spectral,
    Some(Spectral { file: "my wood.rfl".to_owned(), factor: 0.5 })
  );

  recognize_standard("Ks spectral metal.rfl # polished", &mut m);
  assert_eq!(m.specular_spectral.as_ref().map(|s| s.factor), Some(1.0));

  // A second unquoted word is not a factor.
  let outcome = recognize_standard("Ka spectral my wood.rfl", &mut m);
  assert!(matches!(
    outcome,
    Outcome::Rejected(ErrorKind::Field { error: ValueError::MalformedNumber { .. }, .. })
  ));
  assert_eq!(m.ambient_spectral, None);
}

#[test]
fn test_keyword_needs_boundary() {
  let mut m = Material::new("m");
  for line in ["Kaaa 1 2 3", "dissolve 1", "bump -bm 1 bump.png", "# Ka 1 2 3"] {
    assert_eq!(recognize_standard(line, &mut m), Outcome::Unrecognized);
  }
  assert_eq!(m, Material::new("m"));
}

#[test]
fn test_bad_value_leaves_field() {
  let mut m = Material::new("y");
  recognize_standard("Ka 0.1 0.2 0.3", &mut m);
  let outcome = recognize_standard("Ka 0.9 notanumber 0.9", &mut m);

  assert!(outcome.is_recognized());
  assert_eq!(
    outcome,
    Outcome::Rejected(ErrorKind::Field {
      keyword: "Ka",
      material: "y".to_owned(),
      error: ValueError::IncompleteVector { component: 1 },
    })
  );
  assert_eq!(m.ambient, Color { r: 0.1, g: 0.2, b: 0.3 });
}

#[test]
fn test_first_shape_only() {
  // `xyz` selects the first shape; its values fail and no other shape is tried.
  let mut m = Material::new("m");
  let outcome = recognize_standard("Kd xyz spectral a.rfl", &mut m);
  let error = ValueError::IncompleteVector { component: 0 };
  assert!(matches!(outcome, Outcome::Rejected(ErrorKind::Field { error: e, .. }) if e == error));
  assert_eq!(m.diffuse_spectral, None);
}

#[test]
fn test_scalars() {
  let mut m = Material::new("m");
  recognize_standard("illum 2", &mut m);
  recognize_standard("Ns 96.078431", &mut m);
  recognize_standard("sharpness 60", &mut m);
  recognize_standard("Ni 1.45", &mut m);
  recognize_standard("d 0.5", &mut m);
  recognize_standard("map_aat on", &mut m);

  assert_eq!(m.illumination, 2);
  assert_eq!(m.specular_exponent, 96.078431);
  assert_eq!(m.sharpness, 60.0);
  assert_eq!(m.optical_density, 1.45);
  assert_eq!(m.dissolve, 0.5);
  assert!(!m.dissolve_halo);
  assert!(m.anti_aliasing);
}

#[test]
fn test_scalar_unfinished_exponent() {
  let mut m = Material::new("m");
  assert_eq!(recognize_standard("Ns 1e", &mut m), Outcome::Applied(Key::SpecularExponent));
  assert_eq!(m.specular_exponent, 1.0);
  recognize_standard("illum 99999999999", &mut m);
  assert_eq!(m.illumination, 999_999_999);
}

#[test]
fn test_dissolve_halo() {
  let mut m = Material::new("m");
  let outcome = recognize_standard("d -halo 0.66", &mut m);
  assert_eq!(outcome, Outcome::Applied(Key::Dissolve));
  assert_eq!(m.dissolve, 0.66);
  assert!(m.dissolve_halo);

  recognize_standard("d 1", &mut m);
  assert_eq!(m.dissolve, 1.0);
  assert!(!m.dissolve_halo);
}

#[test]
fn test_map_options() {
  let mut m = Material::new("m");
  let outcome = recognize_standard(
    "map_Kd -s 2 2 -clamp on -blendu off -mm 0.1 2 -texres 512x256 \"brick wall.png\"",
    &mut m,
  );
  assert_eq!(outcome, Outcome::Applied(Key::DiffuseMap));

  let map = &m.diffuse_map;
  assert_eq!(map.name, "diffuse");
  assert_eq!(map.file.as_deref(), Some("brick wall.png"));
  assert_eq!(map.scale, [2.0, 2.0, 1.0]);
  assert!(map.clamp);
  assert!(!map.blend_u);
  assert!(map.blend_v);
  assert_eq!(map.base_gain, (0.1, 2.0));
  assert_eq!(map.resolution, Some((512, 256)));
}

#[test]
fn test_map_boost_cc_turbulence() {
  let mut m = Material::new("m");
  let line = "map_Ka -boost 2.5 -cc on -t 0.1 0.2 -texres 256 a.png";
  let outcome = recognize_standard(line, &mut m);
  assert_eq!(outcome, Outcome::Applied(Key::AmbientMap));

  let map = &m.ambient_map;
  assert_eq!(map.boost, Some(2.5));
  assert!(map.color_correction);
  assert_eq!(map.turbulence, [0.1, 0.2, 0.0]);
  assert_eq!(map.resolution, Some((256, 256)));
  assert_eq!(map.file.as_deref(), Some("a.png"));
}

#[test]
fn test_map_path_comment() {
  let mut m = Material::new("m");
  recognize_standard("map_Kd tex.png # diffuse", &mut m);
  assert_eq!(m.diffuse_map.file.as_deref(), Some("tex.png"));

  recognize_standard("map_Ks \"night #2.png\"", &mut m);
  assert_eq!(m.specular_map.file.as_deref(), Some("night #2.png"));
}

#[test]
fn test_too_many_options() {
  let mut m = Material::new("m");
  let line = format!("map_Ka {}x.png", "-clamp on ".repeat(MAX_OPTIONS + 8));
  let outcome = recognize_standard(&line, &mut m);
  assert!(matches!(
    outcome,
    Outcome::Rejected(ErrorKind::Field { error: ValueError::TooManyOptions { .. }, .. })
  ));
  assert_eq!(m.ambient_map, Material::new("m").ambient_map);

  let line = format!("map_Ka {}x.png", "-clamp on ".repeat(MAX_OPTIONS));
  assert_eq!(recognize_standard(&line, &mut m), Outcome::Applied(Key::AmbientMap));
  assert_eq!(m.ambient_map.file.as_deref(), Some("x.png"));
}

#[test]
fn test_map_line_replaces_map() {
  let mut m = Material::new("m");
  recognize_standard("decal -imfchan r -o 0.5 0.5 0.5 first.png", &mut m);
  assert_eq!(m.decal.channel, Channel::R);
  assert_eq!(m.decal.offset, [0.5; 3]);

  recognize_standard("decal second.png", &mut m);
  assert_eq!(m.decal.channel, Channel::M);
  assert_eq!(m.decal.offset, [0.0; 3]);
  assert_eq!(m.decal.file.as_deref(), Some("second.png"));
}

#[test]
fn test_bad_map_option_leaves_map() {
  let mut m = Material::new("m");
  recognize_standard("map_Ns -imfchan q spec.png", &mut m);
  recognize_standard("map_Ka -texres big amb.png", &mut m);
  recognize_standard("disp", &mut m);

  assert_eq!(m, Material::new("m"));
}

#[test]
fn test_unmapped_shape() {
  const ODD: &[FieldSpec] = &[FieldSpec {
    keyword: "Ka",
    key: Key::Ambient,
    options: &[],
    shapes: &[ValueShape::bare(Layout::Float)],
  }];
  let schema = Schema::new(ODD);
  let mut m = Material::new("m");
  let outcome = Recognizer::new(&schema).recognize("Ka 0.5", &mut m);

  assert!(matches!(
    outcome,
    Outcome::Rejected(ErrorKind::Unmapped { keyword: "Ka", .. })
  ));
  assert_eq!(m.ambient, Color::default());
}

#[test]
fn test_int_shape_for_float_field() {
  const INT_NS: &[FieldSpec] = &[FieldSpec {
    keyword: "Ns",
    key: Key::SpecularExponent,
    options: &[],
    shapes: &[ValueShape::bare(Layout::Int)],
  }];
  let schema = Schema::new(INT_NS);
  let mut m = Material::new("m");
  Recognizer::new(&schema).recognize("Ns 250", &mut m);
  assert_eq!(m.specular_exponent, 250.0);
}
