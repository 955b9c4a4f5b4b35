use serde_json::Value;

use crate::{Error, Result};

/// One utterance from the `speechRecord` array, flattened to the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechRecord {
    pub speech_id: String,
    pub issue_id: String,
    pub image_kind: String,
    pub name_of_house: String,
    pub name_of_meeting: String,
    pub issue: String,
    pub date: String,
    pub speech_order: String,
    pub speaker: String,
    pub speaker_group: String,
    pub speaker_position: String,
    pub speaker_role: String,
    pub speech: String,
    pub speech_url: String,
    pub meeting_url: String,
}

impl SpeechRecord {
    /// Missing or null fields become empty strings. The speech text gets its line breaks flattened.
    pub fn from_json(entry: &Value) -> Self {
        let field = |key: &str| field_string(entry, key);
        Self {
            speech_id: field("speechID"),
            issue_id: field("issueID"),
            image_kind: field("imageKind"),
            name_of_house: field("nameOfHouse"),
            name_of_meeting: field("nameOfMeeting"),
            issue: field("issue"),
            date: field("date"),
            speech_order: field("speechOrder"),
            speaker: field("speaker"),
            speaker_group: field("speakerGroup"),
            speaker_position: field("speakerPosition"),
            speaker_role: field("speakerRole"),
            speech: normalize_speech(&field("speech")),
            speech_url: field("speechURL"),
            meeting_url: field("meetingURL"),
        }
    }

    pub fn as_row(&self) -> [&str; 15] {
        [
            self.speech_id.as_str(),
            self.issue_id.as_str(),
            self.image_kind.as_str(),
            self.name_of_house.as_str(),
            self.name_of_meeting.as_str(),
            self.issue.as_str(),
            self.date.as_str(),
            self.speech_order.as_str(),
            self.speaker.as_str(),
            self.speaker_group.as_str(),
            self.speaker_position.as_str(),
            self.speaker_role.as_str(),
            self.speech.as_str(),
            self.speech_url.as_str(),
            self.meeting_url.as_str(),
        ]
    }
}

fn field_string(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        // Numbers keep their literal form (`speechOrder: 3` -> "3").
        Some(other) => other.to_string(),
    }
}

/// Replaces every CRLF, then every remaining LF, with a single space.
#[inline]
pub fn normalize_speech(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}

/// Reads `numberOfRecords` out of a count probe response.
pub fn parse_total(body: &str) -> Result<usize> {
    let json: Value = serde_json::from_str(body)?;
    json.get("numberOfRecords")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| Error::Protocol {
            field: "numberOfRecords",
            message: json.get("message").and_then(Value::as_str).map(String::from),
        })
}

/// Parses one result page. `None` means the page carried no records, which ends the download.
pub fn parse_page(body: &str) -> Result<Option<Vec<SpeechRecord>>> {
    let json: Value = serde_json::from_str(body)?;
    let records = match json.get("speechRecord").and_then(Value::as_array) {
        Some(entries) if !entries.is_empty() => entries.iter().map(SpeechRecord::from_json).collect(),
        _ => return Ok(None),
    };
    Ok(Some(records))
}
