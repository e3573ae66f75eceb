use once_cell::sync::Lazy;
use regex::Regex;

/// Grouping label for VLANs whose name carries no port token.
pub const GENERAL_LABEL: &str = "عام";

static RE_PORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)E(\d+)").expect("valid regex"));

static RE_ETHER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ether(\d+)").expect("valid regex"));

/// Derives a coarse port/group label from a VLAN display name. `E<digits>`
/// wins over `ether<digits>`; both normalize to the `E` form. First matching
/// rule applies, so a name yields at most one label.
pub fn port_label(name: &str) -> String {
    if let Some(cap) = RE_PORT.captures(name) {
        return format!("E{}", &cap[1]);
    }
    if let Some(cap) = RE_ETHER.captures(name) {
        return format!("E{}", &cap[1]);
    }
    GENERAL_LABEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_port_token_wins() {
        assert_eq!(port_label("برج E5 شمال"), "E5");
        assert_eq!(port_label("tower e12"), "E12");
    }

    #[test]
    fn ether_token_normalizes_to_e_form() {
        assert_eq!(port_label("uplink ether3"), "E3");
        assert_eq!(port_label("ETHER07 backbone"), "E07");
    }

    #[test]
    fn unmatched_names_get_the_general_label() {
        assert_eq!(port_label(""), GENERAL_LABEL);
        assert_eq!(port_label("حي الجامعة"), GENERAL_LABEL);
    }
}
