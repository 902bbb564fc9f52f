use crate::domain::entities::target::TargetSet;
use crate::presentation::cli::formatters::table_fmt::format_target_table;

pub fn run_targets(targets: &TargetSet) {
    println!("{}", format_target_table(targets));
}
