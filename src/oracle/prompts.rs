use crate::transcript::Transcript;

/// Render a transcript as `[mm:ss] Speaker: text` lines for prompting
pub fn render_transcript(transcript: &Transcript) -> String {
    let mut rendered = String::new();
    for utterance in &transcript.utterances {
        if let Some(start) = utterance.start_secs {
            rendered.push('[');
            rendered.push_str(&format_timestamp(start));
            rendered.push_str("] ");
        }
        if let Some(speaker) = utterance.speaker.as_deref() {
            rendered.push_str(speaker);
            rendered.push_str(": ");
        }
        rendered.push_str(utterance.text.trim());
        rendered.push('\n');
    }
    rendered
}

fn format_timestamp(secs: f64) -> String {
    let total_secs = secs as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Build a deterministic topic extraction prompt.
pub fn build_topic_prompt(transcript: &str, num_topics: usize) -> String {
    format!(
        "You are an assistant that identifies the main discussion topics of a meeting.\n\
Identify at most {num_topics} topics.\n\
\n\
Return only JSON with exactly this shape:\n\
{{\"topics\": [{{\"label\": \"short topic name\", \"relevance\": 0.0-1.0, \"quotes\": [\"exact sentence from the transcript\"]}}]}}\n\
\n\
Rules:\n\
- Labels are 1-4 words.\n\
- Quotes must be copied verbatim from the transcript.\n\
- Order topics from most to least discussed.\n\
\n\
Transcript:\n\
{transcript}"
    )
}

/// Build a deterministic improvement-suggestion prompt.
pub fn build_suggestion_prompt(metrics_summary: &str, topics: &[String]) -> String {
    let topics = if topics.is_empty() {
        "None detected".to_string()
    } else {
        topics.join(", ")
    };

    format!(
        "You are a meeting coach reviewing measured statistics of a meeting.\n\
\n\
Metrics:\n\
{metrics_summary}\n\
Main topics: {topics}\n\
\n\
Return only JSON with exactly this shape:\n\
{{\"suggestions\": [{{\"category\": \"structure|participation|content|time_management\", \"text\": \"one actionable suggestion\", \"reasoning\": \"which metric motivates it\", \"priority\": 1-5}}]}}\n\
\n\
Rules:\n\
- At most 5 suggestions.\n\
- Priority 1 is most important.\n\
- Base every suggestion on the metrics above."
    )
}
