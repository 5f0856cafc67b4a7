use tracing_indicatif::style::ProgressStyle;

/// Progress bar style for loops with a known length.
pub fn get_progress_style() -> ProgressStyle {
    let style = ProgressStyle::default_bar().template(
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    );

    let style = match style {
        Ok(s) => s,
        Err(_) => ProgressStyle::default_bar(),
    };

    style
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
        .progress_chars("#>-")
}

/// Spinner style for walks whose length is not known up front.
pub fn get_counter_style() -> ProgressStyle {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} file(s)");

    let style = match style {
        Ok(s) => s,
        Err(_) => ProgressStyle::default_spinner(),
    };

    style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}
