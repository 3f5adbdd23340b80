use std::io::IsTerminal;

use termimad::{
    crossterm::style::{Attribute, Color},
    Alignment, MadSkin,
};

/// Print markdown to stdout, styled when attached to a terminal.
pub fn print_md(s: impl AsRef<str>) {
    if std::io::stdout().is_terminal() {
        summary_skin().print_text(s.as_ref());
    } else {
        println!("{}", s.as_ref());
    }
}

fn summary_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    for header in skin.headers.iter_mut() {
        header.align = Alignment::Left;
        header.add_attr(Attribute::Bold);
        header.set_fg(Color::Cyan);
    }
    skin.headers[0].set_bg(Color::DarkCyan);
    skin.headers[0].set_fg(Color::White);
    skin.inline_code.set_fg(Color::Yellow);
    skin
}

#[macro_export]
macro_rules! print_md {
    ($($arg:tt)*) => {
        $crate::utils::md::print_md(format!($($arg)*));
    };
}
