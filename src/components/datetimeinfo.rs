//! Date and time information.
//!
//! Answers "what time is it" and "what day is it" in English or German.
//! Both sentences are beta.

use chrono::{Datelike, Local, NaiveDateTime, Timelike, Weekday};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{Component, ComponentContext};
use crate::error::Result;
use crate::intents::{Intents, Sentence};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    German,
}

impl Language {
    /// Unknown codes fall back to English
    pub fn from_code(code: &str) -> Self {
        match code.split(|c| c == '-' || c == '_').next().unwrap_or_default() {
            "de" => Language::German,
            _ => Language::English,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateTimeInfoConfig {
    /// Overrides `home_intent.language` for this component
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug)]
pub struct DateTimeInfo {
    language: Language,
}

impl DateTimeInfo {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn date(&self) -> String {
        format_date(&Local::now().naive_local(), self.language)
    }

    pub fn time(&self) -> String {
        format_time(&Local::now().naive_local(), self.language)
    }

    fn info_date(&self) -> String {
        match self.language {
            Language::English => format!("Today is {}", self.date()),
            Language::German => format!("Heute ist {}", self.date()),
        }
    }

    fn info_time(&self) -> String {
        match self.language {
            Language::English => format!("It is {}", self.time()),
            Language::German => format!("Es ist {}", self.time()),
        }
    }

    fn phrases(&self) -> (&'static [&'static str], &'static [&'static str]) {
        match self.language {
            Language::English => (EN_DATE_PHRASES, EN_TIME_PHRASES),
            Language::German => (DE_DATE_PHRASES, DE_TIME_PHRASES),
        }
    }
}

const EN_DATE_PHRASES: &[&str] = &["what day is it", "what date is it", "what is the current date"];
const EN_TIME_PHRASES: &[&str] = &[
    "what time is it",
    "what is the time [please]",
    "what's the time [please]",
    "could you [please] tell me the time",
];
const DE_DATE_PHRASES: &[&str] = &["welches datum ist heute", "welcher (tag|wochentag) ist heute"];
const DE_TIME_PHRASES: &[&str] = &["wie spät ist es", "wie (ist|lautet) die [aktuelle] uhrzeit"];

impl Component for DateTimeInfo {
    const NAME: &'static str = "datetimeinfo";

    type Config = DateTimeInfoConfig;

    fn setup(context: ComponentContext<'_, Self::Config>) -> Result<Self> {
        let code = context
            .config
            .language
            .as_deref()
            .unwrap_or(context.settings.home_intent.language.as_str());
        let language = Language::from_code(code);
        debug!(code, ?language, "datetimeinfo language");
        Ok(Self::new(language))
    }

    fn intents(self: Arc<Self>) -> Intents {
        let (date_phrases, time_phrases) = self.phrases();
        let date = Arc::clone(&self);
        let time = self;

        Intents::component(Self::NAME)
            .sentence(
                Sentence::new("info_date", move |_| Some(date.info_date()))
                    .phrases(date_phrases.iter().copied())
                    .beta(),
            )
            .sentence(
                Sentence::new("info_time", move |_| Some(time.info_time()))
                    .phrases(time_phrases.iter().copied())
                    .beta(),
            )
    }
}

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const DE_MONTHS: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
    "Oktober", "November", "Dezember",
];

fn weekday_name(day: Weekday, language: Language) -> &'static str {
    match (language, day) {
        (Language::English, Weekday::Mon) => "Monday",
        (Language::English, Weekday::Tue) => "Tuesday",
        (Language::English, Weekday::Wed) => "Wednesday",
        (Language::English, Weekday::Thu) => "Thursday",
        (Language::English, Weekday::Fri) => "Friday",
        (Language::English, Weekday::Sat) => "Saturday",
        (Language::English, Weekday::Sun) => "Sunday",
        (Language::German, Weekday::Mon) => "Montag",
        (Language::German, Weekday::Tue) => "Dienstag",
        (Language::German, Weekday::Wed) => "Mittwoch",
        (Language::German, Weekday::Thu) => "Donnerstag",
        (Language::German, Weekday::Fri) => "Freitag",
        (Language::German, Weekday::Sat) => "Samstag",
        (Language::German, Weekday::Sun) => "Sonntag",
    }
}

/// Full date: "Friday, October 16, 2026" / "Freitag, 16. Oktober 2026"
pub fn format_date(now: &NaiveDateTime, language: Language) -> String {
    let weekday = weekday_name(now.weekday(), language);
    let month = now.month0() as usize;
    match language {
        Language::English => format!("{weekday}, {} {}, {}", EN_MONTHS[month], now.day(), now.year()),
        Language::German => format!("{weekday}, {}. {} {}", now.day(), DE_MONTHS[month], now.year()),
    }
}

/// Medium time: "3:04:05 PM" / "15:04:05"
pub fn format_time(now: &NaiveDateTime, language: Language) -> String {
    match language {
        Language::English => {
            let (pm, hour) = now.hour12();
            format!(
                "{hour}:{:02}:{:02} {}",
                now.minute(),
                now.second(),
                if pm { "PM" } else { "AM" }
            )
        }
        Language::German => now.format("%H:%M:%S").to_string(),
    }
}
