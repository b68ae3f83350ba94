// src/services/summary.rs
//
// Resumo de notas por IA (Gemini). O contrato do serviço é nunca falhar:
// sem chave, com timeout ou com resposta inválida ele degrada para um
// resumo local determinístico.

use std::time::Duration;

use serde_json::{Value, json};

/// Limite de caracteres do resumo local para nota única.
const SINGLE_NOTE_LIMIT: usize = 200;
/// Limite de caracteres da "última nota" no resumo local de várias notas.
const LATEST_NOTE_LIMIT: usize = 150;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

#[derive(Clone)]
pub struct SummaryService {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl SummaryService {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY ausente; resumos usarão o fallback local");
        }
        // A chamada externa é limitada por timeout: nunca segura a
        // requisição indefinidamente.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Resume as notas de um lead (mais recente primeiro). Nunca retorna erro.
    pub async fn summarize(&self, notes: &[String], lead_name: &str) -> String {
        if notes.is_empty() {
            return "No notes available for this lead.".to_string();
        }

        let Some(api_key) = &self.api_key else {
            return fallback_summary(notes, lead_name);
        };

        let prompt = summary_prompt(&prepare_context(notes, lead_name));

        // Uma retentativa antes de degradar para o resumo local.
        for attempt in 0..2 {
            match self.generate(api_key, &prompt).await {
                Ok(text) if !text.is_empty() => return text,
                Ok(_) => {
                    tracing::warn!("resposta vazia do Gemini (tentativa {})", attempt + 1);
                }
                Err(e) => {
                    tracing::warn!("falha na chamada ao Gemini (tentativa {}): {e}", attempt + 1);
                }
            }
        }

        fallback_summary(notes, lead_name)
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> anyhow::Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response: Value = self
            .client
            .post(format!("{GEMINI_URL}?key={api_key}"))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(text.trim().to_string())
    }
}

fn prepare_context(notes: &[String], lead_name: &str) -> String {
    if notes.len() == 1 {
        return format!("Note for {lead_name}:\n{}", notes[0]);
    }

    let mut parts = vec![format!("Notes for {lead_name}:")];
    for (i, note) in notes.iter().enumerate() {
        parts.push(format!("\nNote {}:\n{note}", i + 1));
    }
    parts.join("\n")
}

fn summary_prompt(context: &str) -> String {
    format!(
        "You are a sales assistant helping to summarize lead notes. Please provide \
         a concise, professional summary of the following notes:\n\n{context}\n\n\
         Please provide:\n\
         1. A brief overview of the lead's current situation\n\
         2. Key points from the notes\n\
         3. Any action items or follow-ups needed\n\
         4. Overall sentiment or progress indication\n\n\
         Keep the summary professional and actionable. Focus on the most important \
         information that would help a sales team understand the lead's status."
    )
}

/// Corta em `limit` caracteres, anexando "..." quando houve corte.
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{cut}...")
    }
}

/// Resumo local determinístico usado quando a IA não responde.
fn fallback_summary(notes: &[String], lead_name: &str) -> String {
    if notes.len() == 1 {
        return format!(
            "Summary for {lead_name}: {}",
            truncate(&notes[0], SINGLE_NOTE_LIMIT)
        );
    }

    let mut parts = vec![
        format!("Summary for {lead_name}:"),
        format!("Total notes: {}", notes.len()),
    ];
    // notes chega ordenado da mais recente para a mais antiga.
    parts.push(format!(
        "Latest note: {}",
        truncate(&notes[0], LATEST_NOTE_LIMIT)
    ));
    parts.push("(AI summary unavailable - showing basic summary)".to_string());

    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_notes_short_circuit_without_calling_anything() {
        let svc = SummaryService::new(None);
        let summary = svc.summarize(&[], "Acme").await;
        assert_eq!(summary, "No notes available for this lead.");
    }

    #[tokio::test]
    async fn without_api_key_falls_back_to_local_summary() {
        let svc = SummaryService::new(None);
        assert!(!svc.is_available());
        let summary = svc.summarize(&["met them".to_string()], "Acme").await;
        assert_eq!(summary, "Summary for Acme: met them");
    }

    #[test]
    fn single_note_fallback_truncates_at_200_chars() {
        let long = "a".repeat(250);
        let summary = fallback_summary(&[long], "Acme");
        assert!(summary.starts_with("Summary for Acme: "));
        assert!(summary.ends_with("..."));
        assert!(summary.contains(&"a".repeat(200)));
        assert!(!summary.contains(&"a".repeat(201)));
    }

    #[test]
    fn multi_note_fallback_reports_count_and_latest_note() {
        let notes = vec!["most recent".to_string(), "older".to_string()];
        let summary = fallback_summary(&notes, "Acme");
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines[0], "Summary for Acme:");
        assert_eq!(lines[1], "Total notes: 2");
        assert_eq!(lines[2], "Latest note: most recent");
        assert_eq!(lines[3], "(AI summary unavailable - showing basic summary)");
    }

    #[test]
    fn multi_note_fallback_truncates_latest_note_at_150_chars() {
        let notes = vec!["b".repeat(180), "older".to_string()];
        let summary = fallback_summary(&notes, "Acme");
        assert!(summary.contains(&format!("Latest note: {}...", "b".repeat(150))));
    }

    #[test]
    fn context_numbers_notes_when_there_are_several() {
        let notes = vec!["first".to_string(), "second".to_string()];
        let ctx = prepare_context(&notes, "Acme");
        assert!(ctx.starts_with("Notes for Acme:"));
        assert!(ctx.contains("Note 1:\nfirst"));
        assert!(ctx.contains("Note 2:\nsecond"));

        let single = prepare_context(&notes[..1], "Acme");
        assert_eq!(single, "Note for Acme:\nfirst");
    }
}
