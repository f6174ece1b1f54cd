pub mod theme;

use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::app::state::{RecommendResponse, Recommendation};

const HELP: &[(&str, &str)] = &[
    ("<text>", "describe how you feel and get a shortlist"),
    (":lang a,b", "change the requested languages"),
    (":count n", "change the shortlist size"),
    (":help", "show this help"),
    ("exit", "leave the chat"),
];

/// Pads `text` with spaces to `width` terminal columns.
fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(used)))
}

/// One shortlist entry with every column already padded.
struct Row {
    number: String,
    title: String,
    artist: String,
    language: String,
}

impl Row {
    fn plain(&self) -> String {
        format!("{} {} by {} {}", self.number, self.title, self.artist, self.language)
    }
}

fn rows(recs: &[Recommendation]) -> Vec<Row> {
    let quoted: Vec<String> = recs.iter().map(|r| format!("'{}'", r.title)).collect();
    let number_width = recs.len().to_string().len();
    let title_width = quoted.iter().map(|q| UnicodeWidthStr::width(q.as_str())).max().unwrap_or(0);
    let artist_width = recs.iter().map(|r| UnicodeWidthStr::width(r.artist.as_str())).max().unwrap_or(0);

    recs.iter()
        .zip(quoted)
        .enumerate()
        .map(|(i, (rec, title))| Row {
            number: format!("{:>number_width$}.", i + 1),
            title: pad(&title, title_width),
            artist: pad(&rec.artist, artist_width),
            language: format!("[{}]", rec.language),
        })
        .collect()
}

/// Shortlist as plain aligned lines: `1. 'Title' by Artist [language]`.
pub fn shortlist_lines(response: &RecommendResponse) -> Vec<String> {
    rows(&response.recommendations).iter().map(Row::plain).collect()
}

pub fn print_shortlist(out: &mut impl Write, response: &RecommendResponse) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{} {}", theme::dim("Detected emotion:"), theme::emotion(&response.emotion))?;
    if response.recommendations.is_empty() {
        writeln!(out, "{}", theme::muted("No songs found for this mood."))?;
        return Ok(());
    }
    writeln!(out, "{}", theme::title("Recommended songs"))?;

    for row in rows(&response.recommendations) {
        writeln!(
            out,
            "{} {} {} {} {}",
            theme::muted(&row.number),
            theme::song(&row.title),
            theme::dim("by"),
            theme::artist(&row.artist),
            theme::language(&row.language),
        )?;
    }
    writeln!(out)
}

pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    let width = HELP.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, desc) in HELP {
        writeln!(out, "  {} {}", theme::artist(&pad(key, width)), theme::dim(desc))?;
    }
    Ok(())
}

pub fn print_error(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", theme::error("✖"), theme::error(message))
}

pub fn print_banner(out: &mut impl Write, languages: &[String], count: usize) -> io::Result<()> {
    writeln!(out, "{}", theme::title("🎵 moodmix"))?;
    writeln!(
        out,
        "{}",
        theme::dim(&format!(
            "Tell me how you feel. Languages: {} | songs: {count} | :help for commands",
            if languages.is_empty() { "any".to_string() } else { languages.join(", ") },
        ))
    )
}
