/// Department directory: which key press routes the caller where
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use super::dtmf::DtmfDigit;
use super::shared::error::CallError;
use super::shared::result::Result;
use super::shared::value_objects::PhoneNumber;

/// Source of destination numbers, keyed by configuration key
pub trait NumberSource {
    fn number_for(&self, config_key: &str) -> Option<String>;
}

impl NumberSource for HashMap<String, String> {
    fn number_for(&self, config_key: &str) -> Option<String> {
        self.get(config_key).cloned()
    }
}

/// Static menu entry before its number is resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentEntry {
    pub digit: DtmfDigit,
    pub config_key: String,
    pub display_name: String,
}

impl DepartmentEntry {
    pub fn new(digit: DtmfDigit, config_key: &str, display_name: &str) -> Self {
        Self {
            digit,
            config_key: config_key.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// The standard three-department menu
pub fn standard_entries() -> Vec<DepartmentEntry> {
    vec![
        DepartmentEntry::new(DtmfDigit::One, "BILLING_PHONE_NUMBER", "Billing"),
        DepartmentEntry::new(DtmfDigit::Two, "TECH_SUPPORT_PHONE_NUMBER", "Tech Support"),
        DepartmentEntry::new(
            DtmfDigit::Three,
            "CUSTOMER_SERVICE_PHONE_NUMBER",
            "Customer Service",
        ),
    ]
}

/// A department with its resolved destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub digit: DtmfDigit,
    pub config_key: String,
    pub display_name: String,
    /// None when the configured number is missing or blank
    pub number: Option<PhoneNumber>,
}

/// Outcome of looking up a digit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The digit is not on the menu
    Unmapped,
    /// The digit is on the menu but has no usable number
    Misconfigured(&'a Department),
    /// Transfer target
    Destination(&'a Department, &'a PhoneNumber),
}

/// Immutable digit → department mapping, built once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentDirectory {
    departments: Vec<Department>,
}

impl DepartmentDirectory {
    /// Resolve every entry's number from `source`.
    ///
    /// Missing numbers are soft: the department stays on the menu but
    /// resolves to `Misconfigured`. Duplicate digits are rejected.
    pub fn from_source(entries: Vec<DepartmentEntry>, source: &dyn NumberSource) -> Result<Self> {
        let mut departments: Vec<Department> = Vec::with_capacity(entries.len());

        for entry in entries {
            if departments.iter().any(|d| d.digit == entry.digit) {
                return Err(CallError::Validation(format!(
                    "digit {} is mapped more than once",
                    entry.digit
                )));
            }

            let number = source
                .number_for(&entry.config_key)
                .and_then(|raw| PhoneNumber::parse(&raw).ok());

            if number.is_none() {
                warn!(
                    "{} ({}) has no destination number; option {} will be unavailable",
                    entry.display_name, entry.config_key, entry.digit
                );
            }

            departments.push(Department {
                digit: entry.digit,
                config_key: entry.config_key,
                display_name: entry.display_name,
                number,
            });
        }

        Ok(Self { departments })
    }

    /// Look up a pressed digit
    pub fn resolve(&self, digit: DtmfDigit) -> Resolution<'_> {
        match self.departments.iter().find(|d| d.digit == digit) {
            None => Resolution::Unmapped,
            Some(department) => match &department.number {
                Some(number) => Resolution::Destination(department, number),
                None => Resolution::Misconfigured(department),
            },
        }
    }

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    /// Spoken menu, e.g. "press 1 for Billing, 2 for Tech Support, or 3 for Customer Service"
    pub fn menu_phrase(&self) -> String {
        let options: Vec<String> = self
            .departments
            .iter()
            .map(|d| format!("{} for {}", d.digit, d.display_name))
            .collect();

        match options.len() {
            0 => String::new(),
            1 => format!("press {}", options[0]),
            2 => format!("press {} or {}", options[0], options[1]),
            n => format!("press {}, or {}", options[..n - 1].join(", "), options[n - 1]),
        }
    }

    /// Menu as bullet lines for the model instructions
    pub fn menu_lines(&self) -> Vec<String> {
        self.departments
            .iter()
            .map(|d| format!("- Press {} for {}", d.digit, d.display_name))
            .collect()
    }
}
