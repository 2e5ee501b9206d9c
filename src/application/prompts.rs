//! Spoken prompts and model instructions

use crate::domain::directory::DepartmentDirectory;

pub const REPROMPT: &str = "I'm sorry, please choose one of the options I mentioned earlier.";

pub const TRANSFER_FAILED: &str =
    "I'm sorry, I couldn't transfer your call. Is there something else I can help with?";

/// System instructions for the speech model
pub fn instructions(directory: &DepartmentDirectory) -> String {
    let mut text = String::from("You are a friendly assistant providing support.");
    if !directory.is_empty() {
        text.push_str(" Please inform users they can:\n");
        text.push_str(&directory.menu_lines().join("\n"));
    }
    text
}

/// First thing the caller hears
pub fn greeting(company_name: &str, directory: &DepartmentDirectory) -> String {
    let mut text = format!("Hi, thanks for calling {}!", company_name);
    if !directory.is_empty() {
        text.push_str(&format!(" You can {}.", directory.menu_phrase()));
    }
    text.push_str(" You can also just talk to me.");
    text
}

pub fn transfer_confirmation(department: &str) -> String {
    format!(
        "Transferring you to our {} department in a moment. Please hold.",
        department
    )
}

pub fn option_unavailable(department: &str) -> String {
    format!(
        "I'm sorry, {} isn't available right now. Please choose another option, or just tell me how I can help.",
        department
    )
}
