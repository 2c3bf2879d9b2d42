//! Help metadata and the default page renderer.
//!
//! The engine feeds a [`HelpInfo`] as declarations run: every visible
//! option, argument, and command lands here whether or not help was
//! requested, and descending into a matched command resets the model to
//! that level. Rendering is a separate consumer of the collected shape;
//! embedders can read [`HelpInfo`] and lay out their own pages instead.

/// One subcommand row.
#[derive(Debug, Clone)]
pub struct CommandHelp {
    pub name: String,
    pub summary: Option<String>,
}

/// One option or positional-argument row.
#[derive(Debug, Clone)]
pub struct EntryHelp {
    pub alias: Option<char>,
    pub long: Option<String>,
    pub placeholder: Option<String>,
    pub summary: Option<String>,
    pub required: bool,
    pub repeated: bool,
    pub flag: bool,
    pub positional: bool,
}

/// Declared-shape metadata for the level currently being parsed.
#[derive(Debug, Clone)]
pub struct HelpInfo {
    /// Executable name shown in the usage line.
    pub program: String,
    /// Description paragraph for the rendered level.
    pub about: Option<String>,
    /// Matched command path from the root down to the rendered level.
    pub path: Vec<String>,
    pub commands: Vec<CommandHelp>,
    pub entries: Vec<EntryHelp>,
}

impl HelpInfo {
    pub(crate) fn new(program: String) -> Self {
        HelpInfo {
            program,
            about: None,
            path: Vec::new(),
            commands: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub(crate) fn add_command(&mut self, name: &str, summary: &str) {
        self.commands.push(CommandHelp {
            name: name.to_string(),
            summary: non_empty(summary),
        });
    }

    pub(crate) fn add_entry(&mut self, entry: EntryHelp) {
        self.entries.push(entry);
    }

    /// Descend into a matched command: drop the parent's rows and continue
    /// collecting the child's, so the rendered page is always the deepest
    /// matched level's.
    pub(crate) fn enter_command(&mut self, name: &str, summary: &str) {
        self.commands.clear();
        self.entries.clear();
        self.path.push(name.to_string());
        self.about = non_empty(summary);
    }

    /// Names and placeholders declared at the rendered level, in
    /// declaration order (entries first, then commands).
    pub fn declared_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .map(|entry| {
                if entry.positional {
                    entry
                        .placeholder
                        .clone()
                        .unwrap_or_else(|| "argument".to_string())
                } else if let Some(long) = &entry.long {
                    format!("--{long}")
                } else if let Some(alias) = entry.alias {
                    format!("-{alias}")
                } else {
                    String::new()
                }
            })
            .collect();
        names.extend(self.commands.iter().map(|command| command.name.clone()));
        names
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Column where command summaries start.
const COMMAND_ALIGN: usize = 20;
/// Column where option summaries start.
const OPTION_ALIGN: usize = 40;

/// Render the default help page into `out`, wrapping summaries at `width`
/// columns. Pass `usize::MAX` to disable wrapping.
pub fn render(info: &HelpInfo, width: usize, out: &mut String) {
    if let Some(about) = info.about.as_deref() {
        out.push_str(about);
        out.push_str("\n\n");
    }
    render_usage(info, out);
    render_commands(info, width, out);
    render_entries(info, width, out);
}

fn render_usage(info: &HelpInfo, out: &mut String) {
    if info.entries.is_empty() && info.commands.is_empty() {
        return;
    }

    out.push_str("Usage: ");
    out.push_str(&info.program);
    for part in &info.path {
        out.push(' ');
        out.push_str(part);
    }

    let mut argument_num = 0;
    for entry in &info.entries {
        out.push(' ');
        if entry.positional {
            argument_num += 1;
        }
        let name = entry_name(entry, argument_num, true);
        if !entry.required {
            out.push('[');
            out.push_str(&name);
            out.push(']');
        } else if entry.positional {
            out.push('<');
            out.push_str(&name);
            out.push('>');
        } else {
            out.push_str(&name);
        }
    }

    if !info.commands.is_empty() {
        out.push_str(" <command> [args]");
    }
    out.push_str("\n\n");
}

fn render_commands(info: &HelpInfo, width: usize, out: &mut String) {
    if info.commands.is_empty() {
        return;
    }
    let align = COMMAND_ALIGN.min(width.saturating_sub(5));
    for command in &info.commands {
        print_row(out, &command.name, command.summary.as_deref(), align, 2, width);
    }
    out.push('\n');
}

fn render_entries(info: &HelpInfo, width: usize, out: &mut String) {
    let align = OPTION_ALIGN.min(width.saturating_sub(5));
    let mut argument_num = 0;
    for entry in &info.entries {
        if entry.positional {
            // Arguments get their own block under the options.
            if argument_num == 0 {
                out.push('\n');
            }
            argument_num += 1;
        }
        let name = entry_name(entry, argument_num, false);
        print_row(out, &name, entry.summary.as_deref(), align, 4, width);
    }
}

/// Row label: `name` / `name...` for arguments, `-a, --name <value>` for
/// options. The short form (usage line) keeps only one spelling.
fn entry_name(entry: &EntryHelp, argument_num: usize, short_form: bool) -> String {
    if entry.positional {
        let mut name = entry
            .placeholder
            .clone()
            .unwrap_or_else(|| format!("argument{argument_num}"));
        if entry.repeated {
            name.push_str("...");
        }
        return name;
    }

    let mut name = String::new();
    if let Some(alias) = entry.alias {
        name.push('-');
        name.push(alias);
    }
    if let Some(long) = entry.long.as_deref() {
        if !short_form || name.is_empty() {
            if !name.is_empty() {
                name.push_str(", ");
            }
            name.push_str("--");
            name.push_str(long);
        }
    }
    if !entry.flag && (short_form || entry.placeholder.is_some()) {
        let value = entry.placeholder.as_deref().unwrap_or("value");
        name.push_str(" <");
        name.push_str(value);
        if entry.repeated {
            name.push_str("...");
        }
        name.push('>');
    }
    name
}

fn print_row(
    out: &mut String,
    name: &str,
    summary: Option<&str>,
    align: usize,
    indent: usize,
    width: usize,
) {
    push_spaces(out, indent);
    out.push_str(name);

    let Some(summary) = summary.filter(|text| !text.is_empty()) else {
        out.push('\n');
        return;
    };

    // Two spaces minimum between the label and its summary; a label too
    // wide for the column pushes the summary to its own line.
    let mut gap = align as isize - indent as isize - name.len() as isize - 2;
    if gap <= 0 {
        out.push('\n');
        gap = align as isize;
    }

    let mut rest = summary;
    loop {
        push_spaces(out, gap as usize);
        gap = align as isize;
        let part = wrap_len(rest, width.saturating_sub(align + 1));
        out.push_str(&rest[..part]);
        out.push('\n');
        rest = &rest[part..];
        if rest.is_empty() {
            break;
        }
    }
}

/// Byte length of the next wrapped part: everything if it fits, otherwise
/// up to and including the last space within `avail` bytes. A spaceless
/// overlong part is emitted unwrapped.
fn wrap_len(text: &str, avail: usize) -> usize {
    if text.len() <= avail {
        return text.len();
    }
    let mut last_space = None;
    for (i, ch) in text.char_indices() {
        if i + ch.len_utf8() > avail {
            break;
        }
        if ch == ' ' {
            last_space = Some(i + 1);
        }
    }
    last_space.unwrap_or(text.len())
}

fn push_spaces(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push(' ');
    }
}

/// Wrap width for terminal output: the attached terminal's columns, or
/// effectively unlimited when the stream is redirected.
pub(crate) fn terminal_width() -> usize {
    let term = console::Term::stdout();
    if term.is_term() {
        term.size().1 as usize
    } else {
        usize::MAX
    }
}
