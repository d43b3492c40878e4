//! Human-readable tree rendering of parsed materials.
use std::fmt;

use crate::material::{Color, Map, Material, MtlSet, Spectral};

/// Renders a [`MtlSet`] as an indented tree, one material per branch.
///
/// ```
/// use wavefront_mtl::{mtl, tree::Tree};
///
/// let set = mtl::parse("newmtl brick\nillum 2\n");
/// let out = Tree::new("brick.mtl", &set).to_string();
/// assert!(out.contains("└─Material name: brick"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Tree<'a> {
  name: &'a str,
  set: &'a MtlSet,
}

impl<'a> Tree<'a> {
  /// A tree headed by `name`, usually the file the set came from.
  pub fn new(name: &'a str, set: &'a MtlSet) -> Tree<'a> {
    Tree { name, set }
  }
}

fn branch(is_last: bool) -> &'static str {
  if is_last {
    "└─"
  } else {
    "├─"
  }
}

fn color(label: &str, c: &Color) -> String {
  format!("{}: {}, {}, {}", label, c.r, c.g, c.b)
}

fn spectral(label: &str, s: &Option<Spectral>, lines: &mut Vec<String>) {
  if let Some(s) = s {
    lines.push(format!("{}: {} {}", label, s.file, s.factor));
  }
}

fn map(m: &Map) -> String {
  match m.file {
    Some(ref file) => format!("Map name: {} ({})", m.name, file),
    None => format!("Map name: {}", m.name),
  }
}

fn material_lines(m: &Material) -> Vec<String> {
  let mut lines = vec![
    color("ambientColor (Ka)", &m.ambient),
    color("diffuseColor (Kd)", &m.diffuse),
    color("specularColor (Ks)", &m.specular),
    color("transmissionFilter (Tf)", &m.transmission_filter),
  ];
  spectral("ambientColor (Ka spectral)", &m.ambient_spectral, &mut lines);
  spectral("diffuseColor (Kd spectral)", &m.diffuse_spectral, &mut lines);
  spectral("specularColor (Ks spectral)", &m.specular_spectral, &mut lines);
  spectral(
    "transmissionFilter (Tf spectral)",
    &m.transmission_filter_spectral,
    &mut lines,
  );
  lines.push(format!("illumination (illum): {}", m.illumination));
  lines.push(format!(
    "dissolve (d): {}{}",
    m.dissolve,
    if m.dissolve_halo { " -halo" } else { "" }
  ));
  lines.push(format!("specularExponent (Ns): {}", m.specular_exponent));
  lines.push(format!("sharpness (sharpness): {}", m.sharpness));
  lines.push(format!("opticalDensity (Ni): {}", m.optical_density));
  lines.push(format!("mapAntiAliasingTextures (map_aat): {}", m.anti_aliasing));
  lines.extend(m.maps().iter().map(|m| map(m)));
  lines
}

impl<'a> fmt::Display for Tree<'a> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "Object '{}'", self.name)?;
    let count = self.set.materials.len();
    for (i, m) in self.set.materials.iter().enumerate() {
      let is_last = i + 1 == count;
      writeln!(f, "{}Material name: {}", branch(is_last), m.name)?;
      let indent = if is_last { "  " } else { "│ " };
      let lines = material_lines(m);
      for (j, line) in lines.iter().enumerate() {
        writeln!(f, "{}{}{}", indent, branch(j + 1 == lines.len()), line)?;
      }
    }
    Ok(())
  }
}

#[test]
fn test_tree() {
  let mut brick = Material::new("brick");
  brick.ambient = Color { r: 0.1, g: 0.2, b: 0.3 };
  brick.dissolve = 0.5;
  brick.dissolve_halo = true;
  brick.diffuse_map.file = Some("brick.png".to_owned());
  let set = MtlSet {
    materials: vec![Material::new("first"), brick],
  };

  let out = Tree::new("walls.mtl", &set).to_string();
  let lines: Vec<&str> = out.lines().collect();

  assert_eq!(lines[0], "Object 'walls.mtl'");
  assert_eq!(lines[1], "├─Material name: first");
  assert_eq!(lines[2], "│ ├─ambientColor (Ka): 0, 0, 0");
  assert!(lines.contains(&"└─Material name: brick"));
  assert!(lines.contains(&"  ├─ambientColor (Ka): 0.1, 0.2, 0.3"));
  assert!(lines.contains(&"  ├─dissolve (d): 0.5 -halo"));
  assert!(lines.contains(&"  ├─Map name: diffuse (brick.png)"));
  assert_eq!(lines.last(), Some(&"  └─Map name: displacement"));
}

#[test]
fn test_empty_tree() {
  let set = MtlSet::default();
  assert_eq!(Tree::new("none.mtl", &set).to_string(), "Object 'none.mtl'\n");
}
