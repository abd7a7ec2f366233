//! Plain-text rendering of the user listing.

use crate::models::User;

const HEADERS: [&str; 6] = ["Name", "Email", "Phone", "Description", "Role", "Profile Image"];

fn row(user: &User) -> [&str; 6] {
    [
        user.name.as_str(),
        user.email.as_str(),
        user.phone.as_str(),
        user.description.as_str(),
        user.role_name.as_str(),
        user.profile_image.as_str(),
    ]
}

/// Render `users` as an aligned table with one header line.
pub fn render_users(users: &[User]) -> String {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for user in users {
        for (width, cell) in widths.iter_mut().zip(row(user)) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths);
    for user in users {
        push_line(&mut out, row(user), &widths);
    }
    if users.is_empty() {
        out.push_str("(no users)\n");
    }
    out
}

fn push_line<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .into_iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}
