use std::fs;

use tarifa_tools::convert::{convert, convert_file};
use tarifa_tools::model::{Entry, ErrorCode, Severity};
use tarifa_tools::tokenize::{detect_delimiter, tokenize};
use tempfile::tempdir;

const SPANISH_DOC: &str = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
Capítulo,1,Obra nueva,,,,
Subcapítulo,1.1,Fontanería,,,,
Sección,1.1.1,Tuberías,,,,
Partida,1.1.1.1,Tubo cobre 22mm,Suministro e instalación,m,\"21,5\",12
";

#[test]
fn spanish_document_converts_completely() {
    let conversion = convert(SPANISH_DOC);

    assert!(conversion.success);
    assert!(conversion.errors.is_empty());

    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 4);
    assert_eq!(data[0].id(), "1");

    match &data[3] {
        Entry::Item {
            id,
            name,
            description,
            unit,
            iva_percentage,
            pvp,
        } => {
            assert_eq!(id, "1.1.1.1");
            assert_eq!(name, "Tubo cobre 22mm");
            assert_eq!(description, "Suministro e instalación");
            assert_eq!(unit, "m");
            assert_eq!(iva_percentage, "21.50");
            assert_eq!(pvp, "12.00");
        }
        other => panic!("expected an item entry, found {other:?}"),
    }
}

#[test]
fn english_document_converts_and_defaults_description() {
    let source = "\
level,id,name,description,unit,iva_percentage,pvp
chapter,1,Structure,,,,
item,1.1,Concrete slab,,m2,21,100.5
";
    let conversion = convert(source);

    assert!(conversion.success);
    assert!(conversion.errors.is_empty());

    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 2);
    match &data[1] {
        Entry::Item {
            description, pvp, ..
        } => {
            assert_eq!(description, " ");
            assert_eq!(pvp, "100.50");
        }
        other => panic!("expected an item entry, found {other:?}"),
    }
}

#[test]
fn accented_semicolon_document_is_accepted() {
    let source = "\
Nivel;Id;Nombre;Descripción;Ud;%IVA;PVP
Capítulo;1;Cimentación;;;;
";
    let conversion = convert(source);

    assert!(conversion.success);
    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0], Entry::Chapter {
        id: "1".to_string(),
        name: "Cimentación".to_string(),
    });
}

#[test]
fn delimiter_detection_prefers_highest_count() {
    assert_eq!(detect_delimiter("nivel;id;nombre;descripcion;ud;%iva;pvp"), ';');
    assert_eq!(detect_delimiter("a\tb\tc"), '\t');
    assert_eq!(detect_delimiter("a|b|c|d"), '|');
    // Tie between comma and semicolon falls back to comma.
    assert_eq!(detect_delimiter("a,b;c"), ',');
    assert_eq!(detect_delimiter("plain text"), ',');
}

#[test]
fn tokenizer_strips_bom_and_handles_quotes() {
    let rows = tokenize("\u{feff}id,name\n1,\"says \"\"hi\"\", twice\"\n");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].fields, vec!["id", "name"]);
    assert_eq!(rows[1].fields, vec!["1", "says \"hi\", twice"]);
}

#[test]
fn tokenizer_drops_blank_rows_and_keeps_line_numbers() {
    let rows = tokenize("a,b\n\n ,\nc,d");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].line, 1);
    assert_eq!(rows[1].line, 4);
    assert_eq!(rows[1].fields, vec!["c", "d"]);
}

#[test]
fn empty_input_is_a_fatal_parse_error() {
    let conversion = convert("\n \n");

    assert!(!conversion.success);
    assert!(conversion.data.is_none());
    assert_eq!(conversion.errors.len(), 1);
    assert_eq!(conversion.errors[0].code, ErrorCode::ParseError);
    assert_eq!(conversion.errors[0].severity, Severity::Fatal);
}

#[test]
fn header_only_input_fails_with_parse_error() {
    let conversion = convert("nivel,id,nombre,descripcion,ud,%iva,pvp\n");

    assert!(!conversion.success);
    assert_eq!(conversion.errors.len(), 1);
    assert_eq!(conversion.errors[0].code, ErrorCode::ParseError);
}

#[test]
fn incomplete_header_is_a_fatal_structure_error() {
    let conversion = convert("nivel,id,nombre\ncapitulo,1,Uno\n");

    assert!(!conversion.success);
    assert!(conversion.data.is_none());
    assert_eq!(conversion.errors.len(), 1);

    let error = &conversion.errors[0];
    assert_eq!(error.code, ErrorCode::StructureError);
    assert_eq!(error.severity, Severity::Fatal);
    assert!(error.message.contains("%iva"));
    assert!(error.message.contains("iva_percentage"));
}

#[test]
fn duplicate_ids_are_reported_and_deduplicated() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
capitulo,1,Uno,,,,
subcapitulo,1.1,Primero,,,,
subcapitulo,1.1,Repetido,,,,
";
    let conversion = convert(source);

    assert!(conversion.success);
    let duplicate = conversion
        .errors
        .iter()
        .find(|error| error.code == ErrorCode::DuplicateError)
        .expect("duplicate finding present");
    assert_eq!(duplicate.severity, Severity::Error);
    assert_eq!(duplicate.line, Some(4));
    assert_eq!(
        duplicate.original_row.as_deref().map(|fields| fields[2].as_str()),
        Some("Repetido")
    );

    // The first occurrence survives into the output.
    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 2);
}

#[test]
fn missing_ancestor_is_a_hierarchy_error() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
capitulo,1,Uno,,,,
subcapitulo,1.1,Primero,,,,
partida,1.1.1.1,Suelto,desc,ud,10,5
";
    let conversion = convert(source);

    assert!(conversion.success);
    assert_eq!(conversion.errors.len(), 1);

    let error = &conversion.errors[0];
    assert_eq!(error.code, ErrorCode::HierarchyError);
    assert_eq!(error.severity, Severity::Error);
    assert!(error.message.contains("section '1.1.1'"));

    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 2);
}

#[test]
fn item_with_invalid_depth_is_a_hierarchy_error() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
capitulo,1,Uno,,,,
partida,2,Suelto,desc,ud,10,5
";
    let conversion = convert(source);

    assert!(conversion.success);
    assert_eq!(conversion.errors.len(), 1);
    assert_eq!(conversion.errors[0].code, ErrorCode::HierarchyError);
    assert!(conversion.errors[0].message.contains("depth 1"));

    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 1);
}

#[test]
fn row_findings_cite_the_offending_field() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
capitulo,1,Uno,,,,
partida,1.1,Sin unidad,desc,,10,5
partida,1.x,Mal id,desc,ud,10,5
partida,1.2,Iva fuera,desc,ud,150,5
partida,1.3,Pvp negativo,desc,ud,10,-5
almacen,1.4,Nivel raro,desc,ud,10,5
";
    let conversion = convert(source);

    assert!(conversion.success);
    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 1);

    let field_of = |predicate: fn(&str) -> bool| {
        conversion
            .errors
            .iter()
            .filter(|error| error.code == ErrorCode::ValidationError)
            .find(|error| predicate(&error.message))
            .and_then(|error| error.field.as_deref())
    };

    assert_eq!(field_of(|m| m.contains("missing required field")), Some("UD"));
    assert_eq!(field_of(|m| m.contains("dot-separated")), Some("ID"));
    assert_eq!(field_of(|m| m.contains("between 0 and 100")), Some("%IVA"));
    assert_eq!(field_of(|m| m.contains("negative")), Some("PVP"));
    assert_eq!(field_of(|m| m.contains("invalid level")), Some("NIVEL"));
}

#[test]
fn non_numeric_iva_rejects_the_row() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
capitulo,1,Uno,,,,
partida,1.1,Cosa,desc,ud,abc,5
";
    let conversion = convert(source);

    assert!(conversion.success);
    let error = conversion
        .errors
        .iter()
        .find(|error| error.code == ErrorCode::ValidationError)
        .expect("validation finding present");
    assert_eq!(error.field.as_deref(), Some("%IVA"));
    assert!(error.message.contains("'abc' is not a number"));
    assert_eq!(conversion.data.expect("data present").len(), 1);
}

#[test]
fn all_rows_invalid_fails_without_data() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
nave,1,Uno,,,,
";
    let conversion = convert(source);

    assert!(!conversion.success);
    assert!(conversion.data.is_none());
    assert_eq!(conversion.errors.len(), 1);
    assert_eq!(conversion.errors[0].code, ErrorCode::ValidationError);
}

#[test]
fn sibling_gap_is_a_warning_only() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
capitulo,1,Uno,,,,
subcapitulo,1.1,Primero,,,,
subcapitulo,1.3,Salteado,,,,
";
    let conversion = convert(source);

    assert!(conversion.success);
    assert_eq!(conversion.errors.len(), 1);

    let warning = &conversion.errors[0];
    assert_eq!(warning.code, ErrorCode::SequenceError);
    assert_eq!(warning.severity, Severity::Warning);
    assert!(warning.message.contains("'1.3'"));

    let data = conversion.data.expect("data present");
    assert_eq!(data.len(), 3);
}

#[test]
fn envelope_serializes_with_wire_names() {
    let source = "\
nivel,id,nombre,descripcion,ud,%iva,pvp
capitulo,1,Uno,,,,
subcapitulo,1.2,Salteado,,,,
";
    let conversion = convert(source);
    let value = serde_json::to_value(&conversion).expect("envelope serialized");

    assert_eq!(value["success"], serde_json::json!(true));
    assert_eq!(value["data"][0]["level"], serde_json::json!("chapter"));
    assert_eq!(value["errors"][0]["code"], serde_json::json!("SEQUENCE_ERROR"));
    assert_eq!(value["errors"][0]["severity"], serde_json::json!("warning"));
    assert_eq!(
        value["errors"][0]["originalRow"],
        serde_json::json!(["subcapitulo", "1.2", "Salteado", "", "", "", ""])
    );
}

#[test]
fn normalized_output_converts_to_the_same_entries() {
    let first = convert(SPANISH_DOC);
    let first_data = first.data.expect("data present");

    let mut source = String::from("level,id,name,description,unit,iva_percentage,pvp\n");
    for entry in &first_data {
        let line = match entry {
            Entry::Chapter { id, name } => format!("chapter,{id},{name},,,,"),
            Entry::Subchapter { id, name } => format!("subchapter,{id},{name},,,,"),
            Entry::Section { id, name } => format!("section,{id},{name},,,,"),
            Entry::Item {
                id,
                name,
                description,
                unit,
                iva_percentage,
                pvp,
            } => format!("item,{id},{name},{description},{unit},{iva_percentage},{pvp}"),
        };
        source.push_str(&line);
        source.push('\n');
    }

    let second = convert(&source);
    assert!(second.success);
    assert_eq!(second.data.expect("data present"), first_data);
}

#[test]
fn convert_file_writes_the_json_envelope() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("tarifa.csv");
    let output = temp_dir.path().join("tarifa.json");
    fs::write(&input, SPANISH_DOC).expect("input written");

    let conversion = convert_file(&input, &output).expect("conversion ran");
    assert!(conversion.success);

    let written = fs::read_to_string(&output).expect("output read");
    let value: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");
    let entries = value["data"].as_array().expect("data array");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[3]["ivaPercentage"], serde_json::json!("21.50"));
}
