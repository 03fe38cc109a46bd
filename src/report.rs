use colored::Colorize;

use crate::models::MovieDetails;

pub const LINE_WIDTH: usize = 160;
const SEPARATOR_WIDTH: usize = 118;
const PLOT_LABEL: &str = "Plot: ";

/// Greedy word wrap on spaces. A word longer than `width` gets a line of its
/// own rather than being split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + word_len + 1 > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn labelled(label: &str, value: impl std::fmt::Display) -> String {
    format!("{}{}\n", label.red(), value)
}

fn joined_or<'a>(names: impl Iterator<Item = &'a str>, fallback: &str) -> String {
    let names: Vec<&str> = names.collect();
    if names.is_empty() { fallback.to_string() } else { names.join(", ") }
}

/// Multi-line block describing one movie, ending with a separator line.
pub fn format_movie_details(details: &MovieDetails) -> String {
    let movie = &details.movie;
    let mut out = String::new();

    out.push_str(&labelled("Title: ", &movie.title));
    out.push_str(&labelled("Release date: ", movie.release_date.as_deref().unwrap_or("Unknown")));
    out.push_str(&labelled("Rating: ", format!("{:.1}", movie.vote_average)));
    out.push_str(&labelled(
        "Genres: ",
        joined_or(details.genres.iter().map(|g| g.name.as_str()), "No genres attached"),
    ));
    out.push_str(&labelled(
        "Director: ",
        details.director.as_ref().map(|d| d.name.as_str()).unwrap_or("Unknown"),
    ));
    out.push_str(&labelled(
        "Actors: ",
        joined_or(details.actors.iter().map(|a| a.name.as_str()), "No actors attached"),
    ));

    match movie.overview.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        Some(overview) => {
            let lines = wrap_text(&format!("{PLOT_LABEL}{overview}"), LINE_WIDTH);
            for (i, line) in lines.iter().enumerate() {
                match line.strip_prefix(PLOT_LABEL).filter(|_| i == 0) {
                    Some(rest) => out.push_str(&labelled(PLOT_LABEL, rest)),
                    None => {
                        out.push_str(line);
                        out.push('\n');
                    },
                }
            }
        },
        None => out.push_str(&labelled(PLOT_LABEL, "No plot described")),
    }

    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    out
}
