/// Tick economics of a known futures contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instrument {
    pub symbol: &'static str,
    pub tick_size: f64,
    pub tick_value: f64,
}

const KNOWN_INSTRUMENTS: &[Instrument] = &[
    Instrument { symbol: "ES", tick_size: 0.25, tick_value: 12.5 },
    Instrument { symbol: "MES", tick_size: 0.25, tick_value: 1.25 },
    Instrument { symbol: "NQ", tick_size: 0.25, tick_value: 5.0 },
    Instrument { symbol: "MNQ", tick_size: 0.25, tick_value: 0.5 },
    Instrument { symbol: "YM", tick_size: 1.0, tick_value: 5.0 },
    Instrument { symbol: "MYM", tick_size: 1.0, tick_value: 0.5 },
    Instrument { symbol: "RTY", tick_size: 0.1, tick_value: 5.0 },
    Instrument { symbol: "M2K", tick_size: 0.1, tick_value: 0.5 },
    Instrument { symbol: "CL", tick_size: 0.01, tick_value: 10.0 },
    Instrument { symbol: "MCL", tick_size: 0.01, tick_value: 1.0 },
    Instrument { symbol: "GC", tick_size: 0.1, tick_value: 10.0 },
    Instrument { symbol: "MGC", tick_size: 0.1, tick_value: 1.0 },
];

/// Looks up a contract by root symbol. Month codes such as `ESZ4` or `NQ 03-25` resolve to their root.
pub fn lookup(symbol: &str) -> Option<&'static Instrument> {
    let normalized = symbol.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return None;
    }
    if let Some(exact) = KNOWN_INSTRUMENTS.iter().find(|i| i.symbol == normalized) {
        return Some(exact);
    }

    let root: String = normalized
        .split(|c: char| c.is_whitespace() || c == '-' || c == '!')
        .next()
        .unwrap_or_default()
        .to_string();
    if let Some(found) = KNOWN_INSTRUMENTS.iter().find(|i| i.symbol == root) {
        return Some(found);
    }

    // Continuous contracts (CL1) or a month code plus year digits (ESZ4, MNQH25).
    let trimmed = root.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.len() < root.len() && trimmed.len() > 1 {
        if let Some(found) = KNOWN_INSTRUMENTS.iter().find(|i| i.symbol == trimmed) {
            return Some(found);
        }
        let without_month = trimmed
            .char_indices()
            .last()
            .map(|(index, _)| &trimmed[..index])
            .unwrap_or_default();
        return KNOWN_INSTRUMENTS.iter().find(|i| i.symbol == without_month);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_roots_and_contract_months() {
        assert_eq!(lookup("es").map(|i| i.tick_value), Some(12.5));
        assert_eq!(lookup("ESZ4").map(|i| i.symbol), Some("ES"));
        assert_eq!(lookup("MNQH25").map(|i| i.symbol), Some("MNQ"));
        assert_eq!(lookup("NQ 03-25").map(|i| i.symbol), Some("NQ"));
        assert_eq!(lookup("CL1!").map(|i| i.symbol), Some("CL"));
        assert!(lookup("AAPL").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn free_text_symbols_do_not_resolve() {
        assert!(lookup("DAXé1").is_none());
        assert!(lookup("日経225").is_none());
        assert!(lookup("Ölpreis 3").is_none());
    }
}
