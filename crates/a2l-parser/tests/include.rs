use std::fs;
use std::path::Path;

use a2l_parser::{Error, FileId, Parser};

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn include_splices_into_the_enclosing_block() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "meas.a2l",
        r#"
        /begin MEASUREMENT n "engine speed" UWORD conv 1 0 0.0 8000.0
        /end MEASUREMENT"#,
    );

    let ast = Parser::new(
        r#"
        /begin PROJECT p ""
            /begin MODULE m ""
                /include "meas.a2l"
            /end MODULE
        /end PROJECT"#,
    )
    .include_path(dir.path())
    .parse()
    .unwrap();

    let measurements = ast.nodes("MEASUREMENT");
    assert_eq!(measurements.len(), 1);
    assert_eq!(measurements[0].str_field("name"), Some("n"));
}

#[test]
fn nested_includes() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "outer.a2l",
        r#"
        /begin MODULE m ""
            /include "inner.a2l"
        /end MODULE"#,
    );
    write(
        dir.path(),
        "inner.a2l",
        r#"
        /begin GROUP g ""
        /end GROUP"#,
    );

    let ast = Parser::new(
        r#"
        /begin PROJECT p ""
            /include "outer.a2l"
        /end PROJECT"#,
    )
    .include_path(dir.path())
    .parse()
    .unwrap();

    assert_eq!(ast.nodes("GROUP").len(), 1);
}

#[test]
fn positions_point_into_the_included_file() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "meas.a2l",
        "/begin MEASUREMENT n \"\" UWORD conv 1 0 0.0 8000.0\n/end MEASUREMENT",
    );

    let ast = Parser::new(
        r#"
        /begin PROJECT p ""
            /begin MODULE m ""
                /include "meas.a2l"
            /end MODULE
        /end PROJECT"#,
    )
    .include_path(dir.path())
    .parse()
    .unwrap();

    let measurement = &ast.nodes("MEASUREMENT")[0];
    let position = measurement.position();
    assert_ne!(position.file, FileId::ROOT);
    assert_eq!(position.line, 1);
    assert!(ast
        .source_name(position.file)
        .unwrap()
        .ends_with("meas.a2l"));

    let project = ast.project().unwrap();
    assert_eq!(project.position().file, FileId::ROOT);
}

#[test]
fn search_paths_are_tried_in_order() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write(
        first.path(),
        "shared.a2l",
        "/begin MODULE from_first \"\" /end MODULE",
    );
    write(
        second.path(),
        "shared.a2l",
        "/begin MODULE from_second \"\" /end MODULE",
    );

    let ast = Parser::new(
        r#"
        /begin PROJECT p ""
            /include "shared.a2l"
        /end PROJECT"#,
    )
    .include_path(first.path())
    .include_path(second.path())
    .parse()
    .unwrap();

    let modules = ast.project().unwrap().children("module");
    assert_eq!(modules[0].str_field("name"), Some("from_first"));
}

#[test]
fn missing_include() {
    let dir = tempfile::tempdir().unwrap();
    let err = Parser::new("/include \"nowhere.a2l\"")
        .include_path(dir.path())
        .parse()
        .unwrap_err();
    match err {
        Error::IncludeNotFound { path, .. } => assert_eq!(path, "nowhere.a2l"),
        other => panic!("expected IncludeNotFound, got {other}"),
    }
}

#[test]
fn include_cycles_are_detected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.a2l", "/include \"b.a2l\"");
    write(dir.path(), "b.a2l", "/include \"a.a2l\"");

    let err = Parser::new("/include \"a.a2l\"")
        .include_path(dir.path())
        .parse()
        .unwrap_err();
    assert!(matches!(err, Error::IncludeCycle { .. }));
}

#[test]
fn include_path_must_be_a_string() {
    let err = Parser::new("/include meas").parse().unwrap_err();
    assert!(matches!(err, Error::Format { .. }));
}
