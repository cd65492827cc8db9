//! Plain aligned tables for `--format table`.

const MIN_COLUMN: usize = 4;
const GAP: &str = "  ";

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Render rows under `headers`. Missing cells print as `-`; numeric cells
/// are right-aligned.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain([header.chars().count(), MIN_COLUMN])
                .max()
                .unwrap_or(MIN_COLUMN)
        })
        .collect();
    shrink_to_fit(&mut widths, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&clip(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join(GAP);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push("-".repeat(header_line.chars().count()));
    lines.insert(0, header_line);

    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = clip(row.get(i).map_or("-", String::as_str), *width);
                let padded = pad(&cell, *width, is_numeric(&cell));
                if options.color {
                    colorize(&cell, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(GAP);
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

/// Narrow the widest columns one character at a time until the table fits.
fn shrink_to_fit(widths: &mut [usize], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    while widths.iter().sum::<usize>() + gaps > max_width {
        let Some((widest, _)) = widths
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > MIN_COLUMN)
            .max_by_key(|(_, w)| **w)
        else {
            break;
        };
        widths[widest] -= 1;
    }
}

fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{value:>width$}")
    } else {
        format!("{value:<width$}")
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Highlight delete rules and event levels.
fn colorize(cell: &str, padded: String) -> String {
    let code = match cell.to_ascii_lowercase().as_str() {
        "cascade" | "info" | "true" => "32",
        "no action" | "warn" => "33",
        "false" | "n/a" => "31",
        _ => return padded,
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}
