use clap::Parser;

use resume_wizard::flags::Flags;
use resume_wizard::observability;
use resume_wizard::tui;

fn main() -> std::io::Result<()> {
    let flags = Flags::parse();
    observability::init_logging();
    tui::run(flags)
}
