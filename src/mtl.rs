//! A parser for Wavefront's `.mtl` file format, for storing information about
//! the material of which a 3D mesh is composed.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::lex::{Cursor, ErrorKind, ParseError};
use crate::recognize::{Outcome, Recognizer};
use crate::schema::{Schema, BOUNDARY_KEYWORD};

pub use crate::material::{Channel, Color, Map, Material, MtlSet, Spectral};

/// The materials of one input, plus everything that was skipped on the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parsed {
  /// The materials, in file order. Any field may still hold its default.
  pub set: MtlSet,
  /// Field-level failures and orphan lines, in file order.
  pub diagnostics: Vec<ParseError>,
}

/// Failure to obtain the input at all.
#[derive(Debug, Error)]
pub enum LoadError {
  /// The file couldn't be read.
  #[error("failed to open file '{}': {source}", .path.display())]
  Io {
    #[allow(missing_docs)]
    path: PathBuf,
    #[allow(missing_docs)]
    source: io::Error,
  },
}

/// Drives a [`Recognizer`] over the lines of an input.
///
/// ```
/// use wavefront_mtl::mtl::Parser;
/// use wavefront_mtl::schema::Schema;
///
/// let schema = Schema::standard();
/// let parsed = Parser::new(&schema).parse_str("newmtl brick\nillum 2\n");
/// assert_eq!(parsed.set.materials[0].illumination, 2);
/// ```
#[derive(Clone, Debug)]
pub struct Parser<'s> {
  recognizer: Recognizer<'s>,
  source: Option<String>,
}

impl<'s> Parser<'s> {
  /// A parser for the given keyword table.
  pub fn new(schema: &'s Schema) -> Parser<'s> {
    Parser {
      recognizer: Recognizer::new(schema),
      source: None,
    }
  }

  /// Names the input in logged diagnostics, usually after its file.
  pub fn source_name<S: Into<String>>(mut self, name: S) -> Parser<'s> {
    self.source = Some(name.into());
    self
  }

  fn report(&self, diagnostics: &mut Vec<ParseError>, line_number: usize, kind: ErrorKind) {
    let error = ParseError { line_number, kind };
    match self.source {
      Some(ref source) => warn!("{}: {}", source, error),
      None => warn!("{}", error),
    }
    diagnostics.push(error);
  }

  /// Parses lines that have already been split on line terminators.
  pub fn parse_lines<I, S>(&self, lines: I) -> Parsed
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut parsed = Parsed::default();

    for (index, line) in lines.into_iter().enumerate() {
      let line = line.as_ref();
      let line_number = index + 1;

      let mut cursor = Cursor::new(line);
      cursor.skip_optional_chars();

      if cursor.eat_word(BOUNDARY_KEYWORD) {
        let name = cursor.rest().trim();
        debug!("created material '{}'", name);
        parsed.set.materials.push(Material::new(name));
        continue;
      }

      if cursor.at_end() || cursor.rest().starts_with('#') {
        continue;
      }

      let outcome = match parsed.set.materials.last_mut() {
        Some(material) => self.recognizer.recognize(line, material),
        None => Outcome::Rejected(ErrorKind::OrphanField {
          line: line.to_owned(),
        }),
      };

      if let Outcome::Rejected(kind) = outcome {
        self.report(&mut parsed.diagnostics, line_number, kind);
      }
    }

    parsed
  }

  /// Splits `input` on line terminators and parses it.
  pub fn parse_str(&self, input: &str) -> Parsed {
    self.parse_lines(input.lines())
  }
}

/// Parses a wavefront `.mtl` file with the standard keyword table. Malformed
/// fields are logged and left at their defaults; see [`Parser`] to collect
/// them instead.
pub fn parse<S: AsRef<str>>(input: S) -> MtlSet {
  Parser::new(&Schema::standard())
    .parse_str(input.as_ref())
    .set
}

/// Reads and parses a `.mtl` file with the standard keyword table.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Parsed, LoadError> {
  let path = path.as_ref();
  let input = fs::read_to_string(path).map_err(|source| LoadError::Io {
    path: path.to_owned(),
    source,
  })?;
  Ok(
    Parser::new(&Schema::standard())
      .source_name(path.display().to_string())
      .parse_str(&input),
  )
}

#[cfg(test)]
fn parse_standard(input: &str) -> Parsed {
  Parser::new(&Schema::standard()).parse_str(input)
}

#[test]
fn test_parse() {
  let test_case = r#"
# Blender MTL File: 'None'
# Material Count: 2

# name
newmtl Material
# Phong specular coefficient
Ns 96.078431
# ambient color (weighted)
Ka 0.000000 0.000000 0.000000
# diffuse color (weighted)
Kd 0.640000 0.640000 0.640000
# dissolve factor (weighted)
Ks 0.500000 0.500000 0.500000
# emissive color (weighted)
Ke 0.100000 0.100000 0.100000
# optical density (refraction)
Ni 1.000000
# alpha
d 1.000000
# illumination: 0=ambient, 1=ambient+diffuse, 2=ambient+diffuse+specular
illum 2

newmtl None
Ns 0
# ambient
Ka 0.000000 0.000000 0.000000
# diffuse
Kd 0.8 0.8 0.8
# specular
Ks 0.8 0.8 0.8
d 1
illum 2"#;

  let mut material = Material::new("Material");
  material.specular_exponent = 96.078431;
  material.diffuse = Color { r: 0.64, g: 0.64, b: 0.64 };
  material.specular = Color { r: 0.5, g: 0.5, b: 0.5 };
  material.optical_density = 1.0;
  material.dissolve = 1.0;
  material.illumination = 2;

  let mut none = Material::new("None");
  none.diffuse = Color { r: 0.8, g: 0.8, b: 0.8 };
  none.specular = Color { r: 0.8, g: 0.8, b: 0.8 };
  none.dissolve = 1.0;
  none.illumination = 2;

  let parsed = parse_standard(test_case);
  assert!(parsed.diagnostics.is_empty());
  assert_eq!(
    parsed.set,
    MtlSet {
      materials: vec![material, none]
    }
  );
}

#[test]
fn test_cube() {
  let test_case = r#"
# Blender MTL File: 'cube.blend'
# Material Count: 1

newmtl Material
Ns 96.078431
Ka 0.000000 0.000000 0.000000
Kd 0.640000 0.640000 0.640000
Ks 0.500000 0.500000 0.500000
Ke 0.000000 0.000000 0.000000
Ni 1.000000
d 1.000000
illum 2
map_Kd cube-uv-num.png
"#;

  let set = parse(test_case);
  assert_eq!(set.materials.len(), 1);
  let material = &set.materials[0];
  assert_eq!(material.name, "Material");
  assert_eq!(material.diffuse_map.file.as_deref(), Some("cube-uv-num.png"));
  assert_eq!(material.ambient_map.file, None);
}

#[test]
fn test_brick() {
  let parsed = parse_standard("newmtl brick\nKa 0.1 0.2 0.3\nKd 0.4 0.5 0.6\nillum 2\n");

  let mut expected = Material::new("brick");
  expected.ambient = Color { r: 0.1, g: 0.2, b: 0.3 };
  expected.diffuse = Color { r: 0.4, g: 0.5, b: 0.6 };
  expected.illumination = 2;

  assert_eq!(parsed.set.materials, vec![expected]);
  assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_orphan_field() {
  let parsed = parse_standard("Ka 0.1 0.2 0.3\nnewmtl x\n");

  assert_eq!(parsed.set.materials, vec![Material::new("x")]);
  assert_eq!(
    parsed.diagnostics,
    vec![ParseError {
      line_number: 1,
      kind: ErrorKind::OrphanField {
        line: "Ka 0.1 0.2 0.3".to_owned()
      },
    }]
  );
}

#[test]
fn test_orphan_lines_only() {
  let parsed = parse_standard("Ka 1 1 1\nKd 1 1 1\nmystery line\n\n# comment\n");
  assert!(parsed.set.materials.is_empty());
  assert_eq!(parsed.diagnostics.len(), 3);
}

#[test]
fn test_malformed_field_is_isolated() {
  let parsed = parse_standard(
    "newmtl y\nKa 0.1 notanumber 0.3\nKd 1 1 1\nnewmtl z\nKa 0.5 0.5 0.5\n",
  );

  assert_eq!(parsed.set.materials.len(), 2);
  let y = &parsed.set.materials[0];
  assert_eq!(y.ambient, Color::default());
  assert_eq!(y.diffuse, Color { r: 1.0, g: 1.0, b: 1.0 });
  assert_eq!(parsed.set.materials[1].ambient, Color { r: 0.5, g: 0.5, b: 0.5 });

  assert_eq!(parsed.diagnostics.len(), 1);
  assert_eq!(parsed.diagnostics[0].line_number, 2);
  assert_eq!(
    parsed.diagnostics[0].to_string(),
    "line 2: failed parsing `Ka` value(s) for material `y`: \
     expected three numbers but component 1 is malformed"
  );
}

#[test]
fn test_newmtl_names() {
  let parsed = parse_standard("newmtl\n  newmtl   spaced name  \r\nnewmtl\tx\nnewmtlx\n");
  let names: Vec<&str> = parsed
    .set
    .materials
    .iter()
    .map(|m| m.name.as_str())
    .collect();
  assert_eq!(names, ["", "spaced name", "x"]);
}

#[test]
fn test_unrecognized_lines_are_silent() {
  let parsed = parse_standard(
    "newmtl a\nbump -bm 0.5 bump.png\nrefl -type sphere sky.png\nKe 1 1 1\n",
  );
  assert_eq!(parsed.set.materials, vec![Material::new("a")]);
  assert!(parsed.diagnostics.is_empty());
}

#[test]
fn test_parse_lines() {
  let lines = vec!["newmtl a".to_owned(), "d -halo 0.25".to_owned()];
  let parsed = Parser::new(&Schema::standard()).parse_lines(&lines);
  assert_eq!(parsed.set.materials[0].dissolve, 0.25);
  assert!(parsed.set.materials[0].dissolve_halo);
}

#[test]
fn test_idempotent() {
  let input = "newmtl a\nKa 1 2 3\nmap_Ka -o 1 2 a.png\nnewmtl b\nillum x\n";
  assert_eq!(parse_standard(input), parse_standard(input));
}

#[test]
fn test_load_missing_file() {
  match load("this/file/does/not/exist.mtl") {
    Err(LoadError::Io { path, .. }) => {
      assert_eq!(path, Path::new("this/file/does/not/exist.mtl"))
    }
    Ok(_) => panic!("expected an error"),
  }
}
