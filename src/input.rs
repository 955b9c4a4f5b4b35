use std::io::{BufRead, Write};
use std::sync::OnceLock;

use regex::Regex;

use crate::{utils::group_thousands, Result, DEFAULT_FROM_DATE, DEFAULT_UNTIL_DATE};

/// Words that cancel the download at the confirmation prompt (compared after trim + lowercase).
const CANCEL_WORDS: [&str; 3] = ["n", "no", "キャンセル"];
/// Written to the conditions report for criteria the operator skipped.
pub const NOT_SPECIFIED: &str = "指定なし";

/// Search conditions captured from the operator, with date defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub any: Option<String>,
    pub name_of_house: Option<String>,
    pub speaker: Option<String>,
    pub from: String,
    pub until: String,
}

impl SearchCriteria {
    /// The criteria part of every request. Pagination controls are added by the caller,
    /// so the count probe and the page requests always agree on everything else.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(any) = &self.any {
            params.push(("any", any.clone()));
        }
        if let Some(house) = &self.name_of_house {
            params.push(("nameOfHouse", house.clone()));
        }
        if let Some(speaker) = &self.speaker {
            params.push(("speaker", speaker.clone()));
        }
        params.push(("from", self.from.clone()));
        params.push(("until", self.until.clone()));
        params
    }

    /// Label/value pairs in the order they appear in the conditions report.
    pub fn conditions(&self) -> [(&'static str, &str); 5] {
        [
            ("検索文字列", or_unset(&self.any)),
            ("院名", or_unset(&self.name_of_house)),
            ("発言者名", or_unset(&self.speaker)),
            ("開始日", self.from.as_str()),
            ("終了日", self.until.as_str()),
        ]
    }
}

fn or_unset(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_SPECIFIED)
}

/// Where a resolved date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Entered,
    Blank,
    Invalid,
}

fn date_pattern() -> &'static Regex {
    static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();
    DATE_PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is valid"))
}

/// Keeps `raw` if it has the `YYYY-MM-DD` shape, otherwise falls back to `default`.
/// Only the shape is checked; `2020-13-99` is accepted.
pub fn resolve_date(raw: &str, default: &str) -> (String, DateSource) {
    let raw = raw.trim();
    if date_pattern().is_match(raw) {
        (raw.to_string(), DateSource::Entered)
    } else if raw.is_empty() {
        (default.to_string(), DateSource::Blank)
    } else {
        (default.to_string(), DateSource::Invalid)
    }
}

pub fn is_cancel(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    CANCEL_WORDS.contains(&answer.as_str())
}

/// Line based question/answer over any reader/writer pair (stdin/stdout in the binary).
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `question`, reads one line and returns it trimmed. End of input reads as blank,
    /// bytes that are not UTF-8 become U+FFFD.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question} >> ")?;
        self.output.flush()?;

        let mut line = Vec::new();
        self.input.read_until(b'\n', &mut line)?;
        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn ask_optional(&mut self, question: &str) -> Result<Option<String>> {
        let answer = self.ask(question)?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    fn ask_date(&mut self, label: &str, default: &str) -> Result<String> {
        let raw = self.ask(&format!("{label} (YYYY-MM-DD, e.g. {default})"))?;
        let (date, source) = resolve_date(&raw, default);
        match source {
            DateSource::Entered => {}
            DateSource::Blank => self.say(&format!("{label} set to {default}."))?,
            DateSource::Invalid => {
                self.say(&format!("WARN: invalid date format. {label} set to {default}."))?
            }
        }
        Ok(date)
    }
}

/// Asks for the five search criteria in order: text, house, speaker, start and end date.
pub fn collect_criteria<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<SearchCriteria> {
    prompter.say("=== Kokkai speech record downloader ===")?;
    prompter.say("Press Enter to skip any field you don't need.")?;

    let any = prompter.ask_optional("Text to search for")?;
    let name_of_house = prompter.ask_optional("House name (衆議院/参議院)")?;
    let speaker = prompter.ask_optional("Speaker name")?;
    let from = prompter.ask_date("Start date", DEFAULT_FROM_DATE)?;
    let until = prompter.ask_date("End date", DEFAULT_UNTIL_DATE)?;

    Ok(SearchCriteria {
        any,
        name_of_house,
        speaker,
        from,
        until,
    })
}

/// Shows the hit count and asks whether to download. Anything but a cancel word proceeds.
pub fn confirm_proceed<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    total: usize,
) -> Result<bool> {
    prompter.say(&format!("Search matched {} records.", group_thousands(total)))?;
    let answer = prompter.ask("Download them? (enter 'n' to cancel) [Y/n]")?;
    Ok(!is_cancel(&answer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn well_formed_dates_are_kept_verbatim() {
        assert_eq!(
            resolve_date("2021-01-15", DEFAULT_FROM_DATE),
            ("2021-01-15".to_string(), DateSource::Entered)
        );
        // Shape only, no calendar check.
        assert_eq!(
            resolve_date("2020-13-99", DEFAULT_FROM_DATE),
            ("2020-13-99".to_string(), DateSource::Entered)
        );
    }

    #[test]
    fn malformed_or_blank_dates_fall_back_to_default() {
        for raw in ["2020/09/01", "20-09-01", "2020-9-1", "2020-09-01x", "yesterday"] {
            let (date, source) = resolve_date(raw, DEFAULT_UNTIL_DATE);
            assert_eq!(date, DEFAULT_UNTIL_DATE, "input {raw:?}");
            assert_eq!(source, DateSource::Invalid);
        }
        assert_eq!(
            resolve_date("", DEFAULT_FROM_DATE),
            (DEFAULT_FROM_DATE.to_string(), DateSource::Blank)
        );
    }

    #[test]
    fn cancel_words() {
        assert!(is_cancel("n"));
        assert!(is_cancel(" NO "));
        assert!(is_cancel("キャンセル"));
        assert!(!is_cancel(""));
        assert!(!is_cancel("y"));
        assert!(!is_cancel("nope"));
    }

    #[test]
    fn collects_criteria_and_reports_defaults() {
        let mut p = prompter("  防衛  \n\n山田太郎\nbad-date\n\n");
        let criteria = collect_criteria(&mut p).unwrap();

        assert_eq!(
            criteria,
            SearchCriteria {
                any: Some("防衛".into()),
                name_of_house: None,
                speaker: Some("山田太郎".into()),
                from: DEFAULT_FROM_DATE.into(),
                until: DEFAULT_UNTIL_DATE.into(),
            }
        );

        let (_, out) = p.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains(&format!("WARN: invalid date format. Start date set to {DEFAULT_FROM_DATE}.")));
        assert!(out.contains(&format!("End date set to {DEFAULT_UNTIL_DATE}.")));
        assert!(!out.contains("WARN: invalid date format. End date"));
    }

    #[test]
    fn exhausted_input_counts_as_blank() {
        let mut p = prompter("");
        let criteria = collect_criteria(&mut p).unwrap();
        assert_eq!(criteria.any, None);
        assert_eq!(criteria.from, DEFAULT_FROM_DATE);
        assert!(confirm_proceed(&mut p, 10).unwrap());
    }

    #[test]
    fn non_utf8_input_still_resolves() {
        // "国会" in Shift_JIS for the text field, then a Shift_JIS start date.
        let mut bytes = b"\x8d\x91\x89\xef\n\n\n".to_vec();
        bytes.extend_from_slice(&[0x8f, 0x4f, 0x8b, 0x63, 0x89, 0x40]);
        bytes.extend_from_slice(b"\n\n");
        let mut p = Prompter::new(Cursor::new(bytes), Vec::new());

        let criteria = collect_criteria(&mut p).unwrap();
        let any = criteria.any.unwrap();
        assert!(any.contains('\u{FFFD}'));
        assert_eq!(criteria.from, DEFAULT_FROM_DATE);
        assert_eq!(criteria.until, DEFAULT_UNTIL_DATE);

        let (_, out) = p.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("WARN: invalid date format. Start date"));
    }

    #[test]
    fn query_params_skip_unset_fields() {
        let criteria = SearchCriteria {
            any: None,
            name_of_house: Some("参議院".into()),
            speaker: None,
            from: "2021-01-01".into(),
            until: "2021-01-31".into(),
        };
        assert_eq!(
            criteria.query_params(),
            vec![
                ("nameOfHouse", "参議院".to_string()),
                ("from", "2021-01-01".to_string()),
                ("until", "2021-01-31".to_string()),
            ]
        );
        assert_eq!(criteria.conditions()[0], ("検索文字列", NOT_SPECIFIED));
    }

    #[test]
    fn confirmation_shows_grouped_total() {
        let mut p = prompter("no\n");
        assert!(!confirm_proceed(&mut p, 12345).unwrap());
        let (_, out) = p.into_inner();
        assert!(String::from_utf8(out).unwrap().contains("12,345"));
    }
}
