/// An entry typed as `+200 bank` or `-100 cash`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct QuickAdd {
    pub amount: i64,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ParseError {
    #[error("empty text")]
    Empty,
    #[error("invalid amount")]
    InvalidAmount,
}

/// Messages starting with a sign are entries.
pub(crate) fn looks_like_quick_add(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('+') || trimmed.starts_with('-')
}

/// Parses `<signed amount> [description]`.
///
/// The first whitespace separated token must be an integer; everything after
/// it is the description.
pub(crate) fn parse_quick_add(input: &str) -> Result<QuickAdd, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let (amount, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((amount, rest)) => (amount, rest.trim()),
        None => (trimmed, ""),
    };
    let amount = amount
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidAmount)?;
    let description = (!rest.is_empty()).then(|| rest.to_string());

    Ok(QuickAdd {
        amount,
        description,
    })
}
