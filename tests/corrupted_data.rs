extern crate proptest;
extern crate wavefront_mtl;

use proptest::prelude::*;
use wavefront_mtl::mtl::{Color, Material, Parser};
use wavefront_mtl::schema::Schema;
use wavefront_mtl::ErrorKind;

fn parse(input: &str) -> wavefront_mtl::mtl::Parsed {
  Parser::new(&Schema::standard()).parse_str(input)
}

fn starts_material(line: &str) -> bool {
  let rest = line.trim_start_matches(|c: char| " \t\r'\"".contains(c));
  rest.starts_with("newmtl")
    && rest[6..]
      .chars()
      .next()
      .map(|c| c == ' ' || c == '\t' || c == '\r')
      .unwrap_or(true)
}

proptest! {
  #[test]
  fn arbitrary_input_never_panics(s in "[ -~\t\n]*") {
    let parsed = parse(&s);
    let expected = s.lines().filter(|l| starts_material(l)).count();
    prop_assert_eq!(parsed.set.materials.len(), expected);
  }

  #[test]
  fn fields_before_newmtl_are_dropped(
    lines in prop::collection::vec(
      ("(Ka|Kd|Ks|Tf|illum|d|Ns|Ni|map_Kd)", "[ 0-9a-z.-]{0,12}"),
      1..20,
    )
  ) {
    let input: String = lines
      .iter()
      .map(|(k, v)| format!("{} {}\n", k, v))
      .collect();
    let parsed = parse(&input);
    prop_assert!(parsed.set.materials.is_empty());
    prop_assert_eq!(parsed.diagnostics.len(), lines.len());
    let all_orphan = parsed
      .diagnostics
      .iter()
      .all(|d| matches!(d.kind, ErrorKind::OrphanField { .. }));
    prop_assert!(all_orphan);
  }

  #[test]
  fn parsing_is_idempotent(
    s in "(newmtl [a-z]{1,4}\n|K[ads] [0-9. x]{0,10}\n|d -halo [0-9.]{1,4}\n|illum [0-9]\n)*"
  ) {
    prop_assert_eq!(parse(&s), parse(&s));
  }

  #[test]
  fn three_scalar_fields_are_verbatim(
    keyword in "(Ka|Kd|Ks|Tf)",
    r in -1000.0f64..1000.0,
    g in -1000.0f64..1000.0,
    b in -1000.0f64..1000.0,
  ) {
    let parsed = parse(&format!("newmtl m\n{} {} {} {}\n", keyword, r, g, b));
    let m = &parsed.set.materials[0];
    let color = match keyword.as_str() {
      "Ka" => m.ambient,
      "Kd" => m.diffuse,
      "Ks" => m.specular,
      _ => m.transmission_filter,
    };
    prop_assert_eq!(color, Color { r, g, b });
  }

  #[test]
  fn bad_field_is_isolated(junk in "[a-z]{1,8}", name in "[a-z]{1,8}") {
    let input = format!("newmtl {}\nKd 1 1 1\nKa 0.5 {} 0.5\nillum 3\n", name, junk);
    let parsed = parse(&input);

    let mut expected = Material::new(name.as_str());
    expected.diffuse = Color { r: 1.0, g: 1.0, b: 1.0 };
    expected.illumination = 3;
    // `inf` and `nan` prefixes are numbers, not junk.
    if !junk.starts_with("inf") && !junk.starts_with("nan") {
      prop_assert_eq!(&parsed.set.materials, &vec![expected]);
      prop_assert_eq!(parsed.diagnostics.len(), 1);
    }
  }
}
