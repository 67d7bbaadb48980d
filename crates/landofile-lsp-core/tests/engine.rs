//! End-to-end queries against a representative Landofile schema.

use landofile_lsp_core::{
    CompletionItemKind, Diagnostic, DiagnosticSeverity, Document, EngineConfig, EngineContext,
    Position, QueryFacade, locate, resolve_path,
};

fn facade() -> QueryFacade {
    let schema =
        serde_json::from_str(include_str!("../../landofile-schema/tests/fixtures/landofile.schema.json"))
            .unwrap();
    let mut facade = QueryFacade::new(EngineContext::new(EngineConfig::default()));
    facade.load_schema(schema);
    facade
}

fn validate(text: &str) -> Vec<Diagnostic> {
    facade().validate(&Document::new("file:///app/.lando.yml", text))
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| {
            format!(
                "{}:{} {}[{}] {}",
                d.range.start.line,
                d.range.start.character,
                d.severity,
                d.code.as_deref().unwrap_or("-"),
                d.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn missing_name_and_recipe() {
    let diagnostics = validate("services:\n  appserver:\n    type: php:8.2\n");
    let text = render(&diagnostics);
    assert!(text.contains("\"name\""), "{text}");
    assert!(text.contains("\"recipe\""), "{text}");
    assert!(diagnostics.iter().all(|d| d.source.as_deref() == Some("landofile")));
}

#[test]
fn numeric_name_is_type_error() {
    let diagnostics = validate("name: 123\nrecipe: lamp\n");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some("type"));
    assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Error);
}

#[test]
fn unknown_recipe_reported_once() {
    let diagnostics = validate("name: app\nrecipe: not-a-recipe\n");
    let codes: Vec<_> = diagnostics.iter().filter_map(|d| d.code.as_deref()).collect();
    assert_eq!(codes, vec!["enum"]);
}

#[test]
fn mixed_problems_snapshot() {
    let text = "\
name: 123
recipe: lamb
excludes:
  - vendor
services:
  appserver:
    type: php:8.2
    via: caddy
";
    insta::assert_snapshot!(render(&validate(text)), @r#"
    0:0 error[type] Incorrect type. Expected "string".
    1:0 error[enum] Value is not accepted. Valid values: "lamp", "lemp", "drupal10", "wordpress", "laravel", "mean".
    2:0 warning[deprecated-property] "excludes" is deprecated.
    7:4 error[enum] Value is not accepted. Valid values: "apache", "nginx", "cli".
    "#);
}

#[test]
fn union_failure_lands_on_its_key() {
    let text = "name: app\nrecipe: lamp\nservices:\n  web:\n    portforward: 0\n";
    let diagnostics = validate(text);
    assert_eq!(diagnostics.len(), 1, "{}", render(&diagnostics));
    assert_eq!(diagnostics[0].range.start.line, 4);
    assert_eq!(diagnostics[0].range.start.character, 4);
}

#[test]
fn sequence_items_map_to_their_key() {
    let text = "name: app\nrecipe: lamp\nservices:\n  web:\n    build:\n      - composer install\n      - 42\n";
    let diagnostics = validate(text);
    assert_eq!(diagnostics.len(), 1, "{}", render(&diagnostics));
    assert_eq!(diagnostics[0].code.as_deref(), Some("type"));
    assert_eq!(diagnostics[0].range.start.line, 4);
}

#[test]
fn malformed_documents_never_panic() {
    let facade = facade();
    for text in [
        "",
        "\n\n\n",
        "name: \"unterminated\n",
        "name: 'also unterminated\nrecipe: lamp",
        "\tname: app\n\trecipe: lamp\n",
        "services:\n\tweb:\n\t\ttype: php\n",
        "name: app\n  recipe: lamp\n",
        "---\nname: a\n---\nname: b\n",
        "&anchor name: *anchor\n",
        "services: !!binary aGVsbG8=\n",
        "name: app\nrecipe: lamp\nservices:\n  web: [unbalanced\n",
        "😀: emoji\nname: 😀\n",
    ] {
        let doc = Document::new("test", text);
        let _ = facade.validate(&doc);
        for line in 0..4 {
            for character in [0, 1, 2, 5, 40] {
                let pos = Position::new(line, character);
                let _ = facade.completions_at(&doc, pos);
                let _ = facade.hover_at(&doc, pos, None);
            }
        }
    }
}

#[test]
fn parse_failure_is_the_only_diagnostic() {
    let diagnostics = validate("name: app\nrecipe: [lamp\n");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some("parse"));
}

#[test]
fn service_key_completion() {
    let doc = Document::new("test", "name: app\nservices:\n  appserver:\n    \n");
    let labels: Vec<String> = facade()
        .completions_at(&doc, Position::new(3, 4))
        .into_iter()
        .map(|item| item.label)
        .collect();
    assert_eq!(
        labels,
        vec!["build", "overrides", "portforward", "run", "ssl", "type", "via"]
    );
}

#[test]
fn tooling_completion_sees_union_members() {
    let doc = Document::new("test", "tooling:\n  drush:\n    \n");
    let labels: Vec<String> = facade()
        .completions_at(&doc, Position::new(2, 4))
        .into_iter()
        .map(|item| item.label)
        .collect();
    assert_eq!(labels, vec!["cmd", "description", "service"]);
}

#[test]
fn recipe_value_completion() {
    let doc = Document::new("test", "recipe: ");
    let items = facade().completions_at(&doc, Position::new(0, 8));
    assert_eq!(items.len(), 6);
    assert!(items.iter().all(|item| item.kind == CompletionItemKind::Value));
}

#[test]
fn deprecated_hover() {
    let doc = Document::new("test", "name: app\nexcludes:\n  - vendor\n");
    let hover = facade().hover_at(&doc, Position::new(1, 3), None).unwrap();
    assert!(hover.contents.contains("Deprecated"));
    assert!(hover.contents.contains("config.excludes"));
}

#[test]
fn hover_through_ref_and_wildcard() {
    let doc = Document::new("test", "services:\n  appserver:\n    type: php:8.2\n");
    let hover = facade().hover_at(&doc, Position::new(2, 6), None).unwrap();
    insta::assert_snapshot!(hover.contents, @r"
    **type** `string`

    Service type and version, e.g. `php:8.2`.
    ");
}

#[test]
fn resolve_then_locate_round_trips() {
    let text = "\
name: app
recipe: lamp
config:
  webroot: web
  php: '8.2'
services:
  appserver:
    type: php:8.2
    build:
      - composer install
  database:
    type: mysql:8.0
    portforward: 3306
tooling:
  drush:
    service: appserver
    cmd: drush
";
    for (line, content) in text.lines().enumerate() {
        if content.trim_start().starts_with('-') {
            continue;
        }
        let path = resolve_path(text, line, 2);
        let range = locate(text, &path, 2).unwrap();
        assert_eq!(range.start.line as usize, line, "{path:?}");
    }
    assert!(validate(text).is_empty(), "{}", render(&validate(text)));
}
