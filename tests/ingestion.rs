use std::io::Write;

use guard_audit::*;
use indoc::indoc;
use tempfile::NamedTempFile;

fn file_with(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f
}

const MODEL: &str = indoc! {r#"
    {
      "name": "press",
      "partial_grafcets": [
        {
          "name": "G_main",
          "transitions": [
            {
              "id": "T1",
              "term": {
                "type": "operator",
                "kind": "and",
                "children": [
                  { "type": "variable", "name": "B1", "kind": "input" },
                  { "type": "variable", "name": "B2", "kind": "input" }
                ]
              }
            },
            {
              "id": "T2",
              "term": {
                "type": "operator",
                "kind": "or",
                "children": [
                  { "type": "variable", "name": "B1", "kind": "input" },
                  {
                    "type": "operator",
                    "kind": "rising_edge",
                    "children": [{ "type": "variable", "name": "B2", "kind": "input" }]
                  }
                ]
              }
            }
          ]
        }
      ]
    }
"#};

#[test]
fn model_and_table_from_files() {
    let model = file_with(MODEL);
    let table = file_with(indoc! {"
        Component;Var1;Var2;Reason
        Cylinder;B1;B2;end positions
        broken line
    "});

    let grafcet = Grafcet::from_path(model.path()).unwrap();
    let table = ExclusionTable::from_path(table.path(), ';').unwrap();
    assert_eq!(table.len(), 1);

    let backend = BddBackend::default();
    let rows = Analyzer::new(&backend, &table).analyze(&grafcet).unwrap();
    let text = render_lines(&rows);

    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![
            "G_main; T1; AND[B1, B2]; Not Satisfied",
            "G_main; T2; OR[B1, AND[AND[B2, NOT[B2_beforeRE]], EQ[B2, NOT[B2_beforeRE]]]]; true - redundantly designed?",
        ]
    );
}

#[test]
fn custom_delimiter_from_config() {
    let config = file_with("[exclusions]\ndelimiter = \",\"\n");
    let config = AuditConfig::from_path(config.path()).unwrap();

    let table = file_with("Var1,Var2\nB1,B2\n");
    let table = ExclusionTable::from_path(table.path(), config.exclusions.delimiter).unwrap();
    assert_eq!(table.rows, vec![ExclusionRow::new("B1", "B2")]);
}

#[test]
fn missing_files_name_their_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let err = Grafcet::from_path(&missing).unwrap_err();
    assert!(err.to_string().contains("nope.json"));
    assert!(matches!(err, ModelError::Io { .. }));

    let err = ExclusionTable::from_path(&dir.path().join("nope.csv"), ';').unwrap_err();
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn json_report() {
    let table = ExclusionTable::from_rows(vec![ExclusionRow::new("B1", "B2")]);
    let grafcet = Grafcet::from_json_str(MODEL).unwrap();
    let backend = BddBackend::default();
    let rows = Analyzer::new(&backend, &table).analyze(&grafcet).unwrap();

    let json: serde_json::Value = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["PartialGrafcetName"], "G_main");
    assert_eq!(json[0]["TransitionCondition"], "AND[B1, B2]");
    assert_eq!(json[1]["Satisfiability"], "true - redundantly designed?");
}
