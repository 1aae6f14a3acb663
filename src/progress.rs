use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const COUNT_TEMPLATE: &str = "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}";
const BYTES_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:40.cyan/blue} {bytes:>10}/{total_bytes:10} {bytes_per_sec} {msg}";

pub(crate) fn new_progress_bar(multibar: &MultiProgress, limit: u64) -> ProgressBar {
    let sty = ProgressStyle::with_template(COUNT_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    let pb = multibar.add(ProgressBar::new(limit));
    pb.set_style(sty);
    pb
}

pub(crate) fn new_byte_progress_bar(multibar: &MultiProgress, limit: u64) -> ProgressBar {
    let sty = ProgressStyle::with_template(BYTES_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    let pb = multibar.add(ProgressBar::new(limit));
    pb.set_style(sty);
    pb
}
