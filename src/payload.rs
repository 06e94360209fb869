//! Turns the form's raw field values into the text that gets encoded.
//!
//! Every data type has its own mini-format (`WIFI:`, `BEGIN:VCARD`, `mailto:`,
//! ...). Building is pure: the same type and fields always give the same
//! string, and an empty string means there is nothing to render.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::error::FieldReadError;

/// Same unreserved set as `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Url,
    Text,
    Wifi,
    Vcard,
    Email,
    Sms,
}

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Url,
        DataType::Text,
        DataType::Wifi,
        DataType::Vcard,
        DataType::Email,
        DataType::Sms,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DataType::Url => "url",
            DataType::Text => "text",
            DataType::Wifi => "wifi",
            DataType::Vcard => "vcard",
            DataType::Email => "email",
            DataType::Sms => "sms",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DataType::Url => "URL",
            DataType::Text => "Text",
            DataType::Wifi => "WiFi",
            DataType::Vcard => "Contact",
            DataType::Email => "Email",
            DataType::Sms => "SMS",
        }
    }

    /// Form fields belonging to this type, in display order.
    pub fn fields(self) -> &'static [Field] {
        match self {
            DataType::Url => &[Field::Url],
            DataType::Text => &[Field::Text],
            DataType::Wifi => &[Field::WifiSsid, Field::WifiPassword, Field::WifiSecurity],
            DataType::Vcard => &[
                Field::VcardFirstName,
                Field::VcardLastName,
                Field::VcardPhone,
                Field::VcardEmail,
            ],
            DataType::Email => &[Field::EmailTo, Field::EmailSubject, Field::EmailBody],
            DataType::Sms => &[Field::SmsPhone, Field::SmsMessage],
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown data type `{}`", s))
    }
}

/// How a field is presented in the form.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Widget {
    Input { input_type: &'static str },
    TextArea,
    Select { options: &'static [&'static str] },
}

pub const WIFI_SECURITY_OPTIONS: &[&str] = &["WPA", "WEP", "nopass"];

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Field {
    Url,
    Text,
    WifiSsid,
    WifiPassword,
    WifiSecurity,
    VcardFirstName,
    VcardLastName,
    VcardPhone,
    VcardEmail,
    EmailTo,
    EmailSubject,
    EmailBody,
    SmsPhone,
    SmsMessage,
}

impl Field {
    /// DOM id of the control backing this field.
    pub fn id(self) -> &'static str {
        match self {
            Field::Url => "url-input",
            Field::Text => "text-input",
            Field::WifiSsid => "wifi-ssid",
            Field::WifiPassword => "wifi-password",
            Field::WifiSecurity => "wifi-security",
            Field::VcardFirstName => "vcard-fname",
            Field::VcardLastName => "vcard-lname",
            Field::VcardPhone => "vcard-phone",
            Field::VcardEmail => "vcard-email",
            Field::EmailTo => "email-to",
            Field::EmailSubject => "email-subject",
            Field::EmailBody => "email-body",
            Field::SmsPhone => "sms-phone",
            Field::SmsMessage => "sms-message",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Url => "Website URL",
            Field::Text => "Text",
            Field::WifiSsid => "Network name (SSID)",
            Field::WifiPassword => "Password",
            Field::WifiSecurity => "Security",
            Field::VcardFirstName => "First name",
            Field::VcardLastName => "Last name",
            Field::VcardPhone => "Phone",
            Field::VcardEmail => "Email",
            Field::EmailTo => "To",
            Field::EmailSubject => "Subject",
            Field::EmailBody => "Message",
            Field::SmsPhone => "Phone number",
            Field::SmsMessage => "Message",
        }
    }

    pub fn widget(self) -> Widget {
        match self {
            Field::Text | Field::EmailBody | Field::SmsMessage => Widget::TextArea,
            Field::WifiSecurity => Widget::Select {
                options: WIFI_SECURITY_OPTIONS,
            },
            Field::Url => Widget::Input { input_type: "url" },
            Field::WifiPassword => Widget::Input {
                input_type: "password",
            },
            Field::VcardPhone | Field::SmsPhone => Widget::Input { input_type: "tel" },
            Field::VcardEmail | Field::EmailTo => Widget::Input {
                input_type: "email",
            },
            _ => Widget::Input { input_type: "text" },
        }
    }
}

/// Raw values of every form control for the current session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: BTreeMap<Field, String>,
    unreadable: BTreeSet<Field>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: &str) -> Self {
        self.set(field, value.to_owned());
        self
    }

    pub fn set(&mut self, field: Field, value: String) {
        self.unreadable.remove(&field);
        self.values.insert(field, value);
    }

    /// Remembers that the control could not be read; until it is read again
    /// the field poisons the payload.
    pub fn mark_unreadable(&mut self, field: Field) {
        self.unreadable.insert(field);
    }

    /// The raw value, empty for fields never touched.
    pub fn get(&self, field: Field) -> Result<&str, FieldReadError> {
        if self.unreadable.contains(&field) {
            return Err(FieldReadError {
                field,
                reason: "last read failed".to_owned(),
            });
        }
        Ok(self.values.get(&field).map(String::as_str).unwrap_or(""))
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    fn trimmed(&self, field: Field) -> Result<&str, FieldReadError> {
        self.get(field).map(|value| value.trim_matches(is_form_whitespace))
    }
}

/// Whitespace as a browser's `String.prototype.trim` sees it: unlike
/// `char::is_whitespace` this includes U+FEFF and excludes U+0085.
fn is_form_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000A}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Builds the payload for `kind`, or an empty string when required fields
/// are missing or a field could not be read.
pub fn build_payload(kind: DataType, fields: &FieldSet) -> String {
    try_build(kind, fields).unwrap_or_default()
}

fn try_build(kind: DataType, fields: &FieldSet) -> Result<String, FieldReadError> {
    let payload = match kind {
        DataType::Url => {
            let url = fields.trimmed(Field::Url)?;
            if url.is_empty() || url.starts_with("http") {
                url.to_owned()
            } else {
                format!("https://{}", url)
            }
        }
        DataType::Text => fields.trimmed(Field::Text)?.to_owned(),
        DataType::Wifi => {
            let ssid = fields.trimmed(Field::WifiSsid)?;
            let password = fields.get(Field::WifiPassword)?;
            let security = fields.get(Field::WifiSecurity)?;
            if ssid.is_empty() {
                String::new()
            } else {
                format!("WIFI:T:{};S:{};P:{};;", security, ssid, password)
            }
        }
        DataType::Vcard => {
            let first = fields.trimmed(Field::VcardFirstName)?;
            let last = fields.trimmed(Field::VcardLastName)?;
            let phone = fields.trimmed(Field::VcardPhone)?;
            let email = fields.trimmed(Field::VcardEmail)?;
            if [first, last, phone, email].iter().all(|v| v.is_empty()) {
                String::new()
            } else {
                format!(
                    "BEGIN:VCARD\nVERSION:3.0\nFN:{} {}\nTEL:{}\nEMAIL:{}\nEND:VCARD",
                    first, last, phone, email
                )
            }
        }
        DataType::Email => {
            let to = fields.trimmed(Field::EmailTo)?;
            let subject = fields.get(Field::EmailSubject)?;
            let body = fields.get(Field::EmailBody)?;
            if to.is_empty() {
                String::new()
            } else {
                format!(
                    "mailto:{}?subject={}&body={}",
                    to,
                    encode_component(subject),
                    encode_component(body)
                )
            }
        }
        DataType::Sms => {
            let phone = fields.trimmed(Field::SmsPhone)?;
            let message = fields.get(Field::SmsMessage)?;
            if phone.is_empty() {
                String::new()
            } else {
                format!("sms:{}?body={}", phone, encode_component(message))
            }
        }
    };
    Ok(payload)
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn url_gets_https_prefix() {
        let fields = FieldSet::new().with(Field::Url, "  example.com ");
        assert_eq!(build_payload(DataType::Url, &fields), "https://example.com");
    }

    #[test]
    fn url_with_scheme_is_unchanged() {
        for url in &["https://example.com", "http://example.com/a?b=c"] {
            let fields = FieldSet::new().with(Field::Url, url);
            assert_eq!(build_payload(DataType::Url, &fields), *url);
        }
    }

    #[test]
    fn malformed_url_passes_through() {
        let fields = FieldSet::new().with(Field::Url, "not a url");
        assert_eq!(build_payload(DataType::Url, &fields), "https://not a url");
    }

    #[test]
    fn blank_url_is_empty() {
        let fields = FieldSet::new().with(Field::Url, "   ");
        assert_eq!(build_payload(DataType::Url, &fields), "");
    }

    #[test]
    fn text_is_trimmed_only() {
        let fields = FieldSet::new().with(Field::Text, "\n hello\tworld  ");
        assert_eq!(build_payload(DataType::Text, &fields), "hello\tworld");
    }

    #[test]
    fn trimming_matches_browser_whitespace() {
        let fields = FieldSet::new().with(Field::Text, "\u{feff}\u{3000}hi\u{2028}");
        assert_eq!(build_payload(DataType::Text, &fields), "hi");

        let fields = FieldSet::new().with(Field::Text, "\u{85}hi\u{85}");
        assert_eq!(build_payload(DataType::Text, &fields), "\u{85}hi\u{85}");
    }

    #[test]
    fn wifi() {
        let fields = FieldSet::new()
            .with(Field::WifiSsid, "Home")
            .with(Field::WifiPassword, "secret")
            .with(Field::WifiSecurity, "WPA");
        assert_eq!(
            build_payload(DataType::Wifi, &fields),
            "WIFI:T:WPA;S:Home;P:secret;;"
        );
    }

    #[test]
    fn wifi_optional_fields_default_to_empty() {
        let fields = FieldSet::new().with(Field::WifiSsid, " Cafe ");
        assert_eq!(build_payload(DataType::Wifi, &fields), "WIFI:T:;S:Cafe;P:;;");
    }

    #[test]
    fn wifi_without_ssid_is_empty() {
        let fields = FieldSet::new()
            .with(Field::WifiPassword, "secret")
            .with(Field::WifiSecurity, "WEP");
        assert_eq!(build_payload(DataType::Wifi, &fields), "");
    }

    #[test]
    fn vcard_all_empty_is_empty() {
        let fields = FieldSet::new()
            .with(Field::VcardFirstName, " ")
            .with(Field::VcardEmail, "");
        assert_eq!(build_payload(DataType::Vcard, &fields), "");
    }

    #[test]
    fn vcard_with_one_field() {
        let fields = FieldSet::new().with(Field::VcardPhone, "+43 1 234");
        assert_eq!(
            build_payload(DataType::Vcard, &fields),
            "BEGIN:VCARD\nVERSION:3.0\nFN: \nTEL:+43 1 234\nEMAIL:\nEND:VCARD"
        );
    }

    #[test]
    fn vcard_full() {
        let fields = FieldSet::new()
            .with(Field::VcardFirstName, "Ada")
            .with(Field::VcardLastName, "Lovelace")
            .with(Field::VcardPhone, "555")
            .with(Field::VcardEmail, "ada@example.com");
        assert_eq!(
            build_payload(DataType::Vcard, &fields),
            "BEGIN:VCARD\nVERSION:3.0\nFN:Ada Lovelace\nTEL:555\nEMAIL:ada@example.com\nEND:VCARD"
        );
    }

    #[test]
    fn email_percent_encodes_subject_and_body() {
        let fields = FieldSet::new()
            .with(Field::EmailTo, " me@example.com ")
            .with(Field::EmailSubject, "Hi there & welcome")
            .with(Field::EmailBody, "Line 1\nÄ (ok)!");
        assert_eq!(
            build_payload(DataType::Email, &fields),
            "mailto:me@example.com?subject=Hi%20there%20%26%20welcome&body=Line%201%0A%C3%84%20(ok)!"
        );
    }

    #[test]
    fn email_without_recipient_is_empty() {
        let fields = FieldSet::new().with(Field::EmailSubject, "orphan");
        assert_eq!(build_payload(DataType::Email, &fields), "");
    }

    #[test]
    fn sms() {
        let fields = FieldSet::new()
            .with(Field::SmsPhone, "+1555")
            .with(Field::SmsMessage, "on my way?");
        assert_eq!(
            build_payload(DataType::Sms, &fields),
            "sms:+1555?body=on%20my%20way%3F"
        );
    }

    #[test]
    fn sms_empty_message() {
        let fields = FieldSet::new().with(Field::SmsPhone, "123");
        assert_eq!(build_payload(DataType::Sms, &fields), "sms:123?body=");
    }

    #[test]
    fn uri_component_keeps_unreserved_marks() {
        assert_eq!(encode_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_component("/?#[]@$+,;="), "%2F%3F%23%5B%5D%40%24%2B%2C%3B%3D");
    }

    #[test]
    fn unreadable_field_gives_empty_payload() {
        let mut fields = FieldSet::new().with(Field::Text, "hello");
        fields.mark_unreadable(Field::Text);
        assert_eq!(build_payload(DataType::Text, &fields), "");

        fields.set(Field::Text, "again".to_owned());
        assert_eq!(build_payload(DataType::Text, &fields), "again");
    }

    #[test]
    fn unreadable_field_of_other_type_is_ignored() {
        let mut fields = FieldSet::new().with(Field::Text, "hello");
        fields.mark_unreadable(Field::SmsPhone);
        assert_eq!(build_payload(DataType::Text, &fields), "hello");
    }

    #[test]
    fn building_is_deterministic() {
        let fields = FieldSet::new()
            .with(Field::EmailTo, "a@b.c")
            .with(Field::EmailBody, "x y");
        for kind in DataType::ALL.iter().copied() {
            assert_eq!(build_payload(kind, &fields), build_payload(kind, &fields));
        }
    }

    #[test]
    fn data_type_names_round_trip() {
        for kind in DataType::ALL.iter().copied() {
            assert_eq!(kind.name().parse::<DataType>(), Ok(kind));
        }
        assert!("fax".parse::<DataType>().is_err());
    }
}
