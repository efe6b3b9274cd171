//! Stamp fields onto a PDF from the command line:
//!
//! ```text
//! cargo run --example sign-document -- input.pdf fields.json signed.pdf
//! ```
//!
//! `fields.json` holds an array of fields in the same JSON form the signing service
//! accepts. Without it, a sample text field, date and checkbox are placed on page 1.

use pdf_stamp::{
    sign_pdf, today, Colour, Field, FieldId, FieldKind, PercentRect, RenderOptions,
};

fn sample_fields() -> Vec<Field> {
    vec![
        Field::new(
            FieldId(1),
            1,
            PercentRect::new(10.0, 80.0, 30.0, 5.0),
            FieldKind::Text {
                text: "Signed from the command line".into(),
            },
        ),
        Field::new(
            FieldId(2),
            1,
            PercentRect::new(60.0, 80.0, 25.0, 5.0),
            FieldKind::Date { date: today() },
        ),
        Field::new(
            FieldId(3),
            1,
            PercentRect::new(10.0, 88.0, 3.0, 3.0),
            FieldKind::Checkbox { checked: true },
        ),
    ]
}

fn main() {
    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "input.pdf".to_string());
    let fields_path = args.next();
    let output = args.next().unwrap_or_else(|| "signed.pdf".to_string());

    let source = std::fs::read(&input).unwrap();
    let fields: Vec<Field> = match fields_path {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap(),
        None => sample_fields(),
    };

    let options = RenderOptions::new()
        .ink(Colour::new_rgb_bytes(0x1a, 0x23, 0x7e))
        .clone();

    let rendered = sign_pdf(&source, &fields, &options).unwrap();
    for skipped in rendered.report.skipped.iter() {
        eprintln!("skipped {} field {}: {}", skipped.field_type, skipped.id, skipped.reason);
    }

    std::fs::write(&output, &rendered.bytes).unwrap();
    println!(
        "wrote {} ({} fields drawn on {} pages)",
        output, rendered.report.fields_drawn, rendered.report.pages_stamped
    );
}
