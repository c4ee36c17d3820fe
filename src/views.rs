//! HTML pages.

use std::fmt::Write;

use axum::http::StatusCode;

use crate::actions::History;
use crate::models::{Item, SparkScore};
use crate::quest::Quest;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, username: Option<&str>, body: &str) -> String {
    let nav = match username {
        Some(name) => format!(
            r#"<nav><a href="/">Home</a> | <a href="/add">Add item</a> | <a href="/history">History</a> | {} <a href="/logout">Log out</a></nav>"#,
            escape(name)
        ),
        None => r#"<nav><a href="/login">Log in</a> | <a href="/register">Register</a></nav>"#.to_string(),
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{} · Spark Joy</title></head>\n<body>\n{}\n<main>\n<h1>{}</h1>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        nav,
        escape(title),
        body
    )
}

fn score_label(score: Option<SparkScore>) -> String {
    match score {
        Some(score) => format!("{} / {}", score, SparkScore::MAX),
        None => "not rated yet".to_string(),
    }
}

pub fn quest_block(quest: &Quest) -> String {
    let heading = if quest.is_special() {
        "Special quest"
    } else {
        "Today's quest"
    };
    format!(
        r#"<section class="quest"><h2>{}</h2><p>{}</p><a href="/resolve_quest/{}">Take on this quest</a></section>"#,
        heading,
        escape(&quest.text),
        quest.target
    )
}

/// `items` are shown in the order given.
pub fn home_page(username: &str, items: &[Item], quest: Option<&Quest>) -> String {
    let mut body = String::new();
    if let Some(quest) = quest {
        body.push_str(&quest_block(quest));
        body.push('\n');
    }

    if items.is_empty() {
        body.push_str(r#"<p>No items yet. <a href="/add">Register your first item.</a></p>"#);
    } else {
        body.push_str("<ul class=\"items\">\n");
        for item in items {
            let features = if item.features.is_empty() {
                String::new()
            } else {
                format!(" <small>{}</small>", escape(&item.features))
            };
            let _ = writeln!(
                body,
                r#"<li><strong>{}</strong> ({}){} · spark: {} · <a href="/rate/{}">rate</a> · <a href="/delete/{}">let go</a></li>"#,
                escape(&item.name),
                escape(&item.category),
                features,
                score_label(item.score),
                item.id,
                item.id
            );
        }
        body.push_str("</ul>");
    }

    layout("My things", Some(username), &body)
}

pub fn add_item_page(username: &str) -> String {
    let body = r#"<form method="post" action="/add">
<label>Name <input name="name" maxlength="100" required></label>
<label>Category <input name="category" maxlength="50" required></label>
<label>Features <textarea name="features" maxlength="200"></textarea></label>
<button type="submit">Add</button>
</form>"#;
    layout("Add an item", Some(username), body)
}

pub fn rate_page(username: &str, item: &Item) -> String {
    let mut options = String::new();
    for value in SparkScore::MIN..=SparkScore::MAX {
        let selected = if item.score.map(SparkScore::value) == Some(value) {
            " selected"
        } else {
            ""
        };
        let _ = write!(options, r#"<option value="{0}"{1}>{0}</option>"#, value, selected);
    }

    let body = format!(
        r#"<p>How much does <strong>{name}</strong> spark joy? Currently: {current}</p>
<form method="post" action="/rate/{id}">
<label>Spark score <select name="score">{options}</select></label>
<label>Mood <input name="mood" maxlength="100"></label>
<button type="submit">Save</button>
</form>"#,
        name = escape(&item.name),
        current = score_label(item.score),
        id = item.id,
        options = options
    );
    layout("Rate an item", Some(username), &body)
}

pub fn delete_page(username: &str, item: &Item) -> String {
    let body = format!(
        r#"<p>Let go of <strong>{name}</strong>? This cannot be undone.</p>
<form method="post" action="/delete/{id}">
<label>How do you feel? <input name="mood" maxlength="100"></label>
<button type="submit">Let it go</button>
</form>"#,
        name = escape(&item.name),
        id = item.id
    );
    layout("Let go", Some(username), &body)
}

pub fn history_page(username: &str, history: &History) -> String {
    let mut body = format!(
        "<p>Rated: {} · Let go: {}</p>\n",
        history.counts.rated, history.counts.deleted
    );

    if history.entries.is_empty() {
        body.push_str("<p>Nothing recorded yet.</p>");
    } else {
        body.push_str("<table>\n<tr><th>When</th><th>Action</th><th>Item</th><th>Mood</th></tr>\n");
        for entry in &history.entries {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.action,
                escape(&entry.item_name),
                escape(&entry.mood)
            );
        }
        body.push_str("</table>");
    }

    layout("History", Some(username), &body)
}

fn credentials_form(action: &str, button: &str) -> String {
    format!(
        r#"<form method="post" action="{}">
<label>Username <input name="username" maxlength="50" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">{}</button>
</form>"#,
        action, button
    )
}

pub fn login_page() -> String {
    layout("Log in", None, &credentials_form("/login", "Log in"))
}

pub fn register_page() -> String {
    layout("Register", None, &credentials_form("/register", "Create account"))
}

pub fn error_page(status: StatusCode, message: &str, offer_login: bool) -> String {
    let mut body = format!("<p>{}</p>", escape(message));
    if offer_login {
        body.push_str(r#"<p><a href="/login">Log in</a></p>"#);
    } else {
        body.push_str(r#"<p><a href="/">Back home</a></p>"#);
    }
    let title = status.canonical_reason().unwrap_or("Error");
    layout(title, None, &body)
}
