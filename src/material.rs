//! The parsed data model: materials and the texture maps they own.

/// A set of materials in one `.mtl` file, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct MtlSet {
  pub materials: Vec<Material>,
}

impl MtlSet {
  /// The last material with the given name. A later `newmtl` with a
  /// repeated name shadows the earlier one.
  pub fn find(&self, name: &str) -> Option<&Material> {
    self.materials.iter().rev().find(|m| m.name == name)
  }
}

/// An RGB (or CIEXYZ) triple.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Color {
  pub r: f64,
  pub g: f64,
  pub b: f64,
}

impl From<[f64; 3]> for Color {
  fn from([r, g, b]: [f64; 3]) -> Color {
    Color { r, g, b }
  }
}

/// A color given as a spectral curve file, e.g. `Kd spectral wood.rfl 0.8`.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectral {
  /// The `.rfl` file.
  pub file: String,
  /// Multiplier applied to the curve. Defaults to 1.
  pub factor: f64,
}

/// A single material that can be applied to any face.
///
/// Every field starts at its type's default; lines that fail to parse leave
/// them there.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
  /// From `newmtl`.
  pub name: String,
  /// `Ka`
  pub ambient: Color,
  /// `Kd`
  pub diffuse: Color,
  /// `Ks`
  pub specular: Color,
  /// `Tf`
  pub transmission_filter: Color,
  /// `Ka spectral`
  pub ambient_spectral: Option<Spectral>,
  /// `Kd spectral`
  pub diffuse_spectral: Option<Spectral>,
  /// `Ks spectral`
  pub specular_spectral: Option<Spectral>,
  /// `Tf spectral`
  pub transmission_filter_spectral: Option<Spectral>,
  /// `illum`, conventionally 0 to 10.
  pub illumination: i32,
  /// `d`, conventionally 0 to 1.
  pub dissolve: f64,
  /// Whether the last `d` line carried `-halo`.
  pub dissolve_halo: bool,
  /// `Ns`, conventionally 0 to 1000.
  pub specular_exponent: f64,
  /// `sharpness`
  pub sharpness: f64,
  /// `Ni`, conventionally 0.001 to 10.
  pub optical_density: f64,
  /// `map_Ka`
  pub ambient_map: Map,
  /// `map_Kd`
  pub diffuse_map: Map,
  /// `map_Ks`
  pub specular_map: Map,
  /// `map_Ns`
  pub specular_exponent_map: Map,
  /// `map_aat`
  pub anti_aliasing: bool,
  /// `decal`
  pub decal: Map,
  /// `disp`
  pub displacement: Map,
}

impl Material {
  /// A material with every field at its default and every map present but
  /// without a file.
  pub fn new<S: Into<String>>(name: S) -> Material {
    Material {
      name: name.into(),
      ambient: Color::default(),
      diffuse: Color::default(),
      specular: Color::default(),
      transmission_filter: Color::default(),
      ambient_spectral: None,
      diffuse_spectral: None,
      specular_spectral: None,
      transmission_filter_spectral: None,
      illumination: 0,
      dissolve: 0.0,
      dissolve_halo: false,
      specular_exponent: 0.0,
      sharpness: 0.0,
      optical_density: 0.0,
      ambient_map: Map::new("ambient", Channel::L),
      diffuse_map: Map::new("diffuse", Channel::L),
      specular_map: Map::new("specular color", Channel::L),
      specular_exponent_map: Map::new("specular exponent", Channel::L),
      anti_aliasing: false,
      decal: Map::new("decal", Channel::M),
      displacement: Map::new("displacement", Channel::L),
    }
  }

  /// The maps in declaration order, for traversal.
  pub fn maps(&self) -> [&Map; 6] {
    [
      &self.ambient_map,
      &self.diffuse_map,
      &self.specular_map,
      &self.specular_exponent_map,
      &self.decal,
      &self.displacement,
    ]
  }
}

/// The channel of an image used for a scalar texture (`-imfchan`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Channel {
  R,
  G,
  B,
  M,
  L,
  Z,
}

impl Channel {
  /// Parses one of `r g b m l z`.
  pub fn from_symbol(s: &str) -> Option<Channel> {
    match s {
      "r" => Some(Channel::R),
      "g" => Some(Channel::G),
      "b" => Some(Channel::B),
      "m" => Some(Channel::M),
      "l" => Some(Channel::L),
      "z" => Some(Channel::Z),
      _ => None,
    }
  }
}

/// A texture bound to one of a material's channels.
///
/// A map line replaces the whole map: modifiers it doesn't name go back to
/// their defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct Map {
  /// The role this map plays, e.g. `"ambient"`.
  pub name: String,
  /// `-blendu`, default on.
  pub blend_u: bool,
  /// `-blendv`, default on.
  pub blend_v: bool,
  /// `-boost`
  pub boost: Option<f64>,
  /// `-cc`, default off.
  pub color_correction: bool,
  /// `-clamp`, default off.
  pub clamp: bool,
  /// `-imfchan`. `l` unless this is a decal, which uses `m`.
  pub channel: Channel,
  /// `-mm base gain`, default `(0, 1)`.
  pub base_gain: (f64, f64),
  /// `-o u v w`, default zero.
  pub offset: [f64; 3],
  /// `-s u v w`, default one.
  pub scale: [f64; 3],
  /// `-t u v w`, default zero.
  pub turbulence: [f64; 3],
  /// `-texres`, as width and height.
  pub resolution: Option<(u32, u32)>,
  /// The image file. `None` until a line names this map.
  pub file: Option<String>,
}

impl Map {
  /// An unbound map with default modifiers.
  pub fn new<S: Into<String>>(name: S, channel: Channel) -> Map {
    Map {
      name: name.into(),
      blend_u: true,
      blend_v: true,
      boost: None,
      color_correction: false,
      clamp: false,
      channel,
      base_gain: (0.0, 1.0),
      offset: [0.0; 3],
      scale: [1.0; 3],
      turbulence: [0.0; 3],
      resolution: None,
      file: None,
    }
  }

  /// The same map with every modifier and the file reset.
  pub fn cleared(&self, default_channel: Channel) -> Map {
    Map::new(self.name.clone(), default_channel)
  }
}

#[test]
fn test_find_last_wins() {
  let mut first = Material::new("wood");
  first.illumination = 1;
  let mut second = Material::new("wood");
  second.illumination = 2;
  let set = MtlSet {
    materials: vec![first, Material::new("stone"), second],
  };

  assert_eq!(set.find("wood").map(|m| m.illumination), Some(2));
  assert!(set.find("stone").is_some());
  assert!(set.find("glass").is_none());
}

#[test]
fn test_new_material_maps() {
  let m = Material::new("x");
  let maps = m.maps();
  let names: Vec<&str> = maps.iter().map(|map| map.name.as_str()).collect();
  assert_eq!(
    names,
    [
      "ambient",
      "diffuse",
      "specular color",
      "specular exponent",
      "decal",
      "displacement"
    ]
  );
  assert_eq!(m.decal.channel, Channel::M);
  assert!(maps.iter().all(|map| map.file.is_none()));
}
