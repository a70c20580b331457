//! Scripted Oracle Example
//!
//! This example runs a full `analyze` / `ask` round trip without network
//! access. The oracle below answers locally by counting the vote phrases it
//! sees in each fragment, which is enough to show the request flow.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example scripted_oracle -- votos.xlsx
//! ```
//!
//! If no argument is provided, a small workbook is generated in memory.

use std::fs;
use std::io::Cursor;

use rust_xlsxwriter::Workbook;
use xlsxtally::{
    AnalyzerBuilder, ClassificationOracle, CompletionRequest, OracleConfig, OracleError, Role,
    Session, VoteCategory, VoteTally,
};

/// Answers every request from the text of its last user message.
struct LocalOracle;

impl ClassificationOracle for LocalOracle {
    fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let text = request
            .messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.as_str())
            .ok_or_else(|| OracleError::Unavailable("request has no user message".to_string()))?;

        if text.starts_with('¿') {
            return Ok("Consulte el conteo mostrado tras la carga.".to_string());
        }

        let tally = VoteTally::from_response(text);
        let reply = VoteCategory::ALL
            .into_iter()
            .flat_map(|category| {
                std::iter::repeat(category.label()).take(tally.get(category) as usize)
            })
            .collect::<Vec<_>>()
            .join(", ");
        Ok(reply)
    }
}

fn sample_workbook() -> Result<Vec<u8>, rust_xlsxwriter::XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Votos")?;
    worksheet.write_string(0, 0, "Mesa")?;
    worksheet.write_string(0, 1, "Comentario")?;

    let comments = ["voto noboa", "Voto Luisa", "voto nulo (tachado)", "voto noboa"];
    for (row, comment) in (1u32..).zip(comments) {
        worksheet.write_number(row, 0, f64::from(row))?;
        worksheet.write_string(row, 1, comment)?;
    }
    workbook.save_to_buffer()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let (file_name, data) = match std::env::args().nth(1) {
        Some(path) => {
            let data = fs::read(&path)?;
            (path, data)
        }
        None => ("muestra.xlsx".to_string(), sample_workbook()?),
    };

    let analyzer = AnalyzerBuilder::new()
        .with_oracle_config(OracleConfig::new("sk-local"))
        .build()?;
    let mut session = Session::new();

    let report = analyzer.analyze(&mut session, &file_name, Cursor::new(data), &LocalOracle)?;
    println!("Datos extraídos (Muestra): {}", report.document.preview(500));
    println!("{}", report.tally.summary());
    println!("{}", report.chart().to_json()?);

    let answer = analyzer.ask(&mut session, "¿Quién tiene más votos?", &LocalOracle)?;
    println!("{}", answer);

    println!("\nTranscript:");
    println!("{}", serde_json::to_string_pretty(session.transcript())?);

    Ok(())
}
