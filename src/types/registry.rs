//! Fixed lookup tables for brand attributes.
//!
//! These are compiled in and never change at runtime. Brand list fields that
//! name payment methods, game types, countries or currencies must use codes
//! from the matching table.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub code: &'static str,
    pub label: &'static str,
}

const fn entry(code: &'static str, label: &'static str) -> Entry {
    Entry { code, label }
}

pub const PAYMENT_METHODS: &[Entry] = &[
    entry("visa", "Visa"),
    entry("mastercard", "Mastercard"),
    entry("maestro", "Maestro"),
    entry("paypal", "PayPal"),
    entry("skrill", "Skrill"),
    entry("neteller", "Neteller"),
    entry("paysafecard", "Paysafecard"),
    entry("trustly", "Trustly"),
    entry("revolut", "Revolut"),
    entry("apple-pay", "Apple Pay"),
    entry("google-pay", "Google Pay"),
    entry("bank-transfer", "Bank Transfer"),
    entry("bitcoin", "Bitcoin"),
    entry("ethereum", "Ethereum"),
    entry("litecoin", "Litecoin"),
    entry("usdt", "Tether (USDT)"),
];

pub const GAME_TYPES: &[Entry] = &[
    entry("slots", "Slots"),
    entry("live-casino", "Live Casino"),
    entry("blackjack", "Blackjack"),
    entry("roulette", "Roulette"),
    entry("baccarat", "Baccarat"),
    entry("poker", "Poker"),
    entry("jackpots", "Jackpots"),
    entry("crash", "Crash Games"),
    entry("bingo", "Bingo"),
    entry("keno", "Keno"),
    entry("scratch-cards", "Scratch Cards"),
    entry("sports-betting", "Sports Betting"),
    entry("esports", "Esports"),
    entry("virtual-sports", "Virtual Sports"),
];

pub const COUNTRIES: &[Entry] = &[
    entry("RO", "Romania"),
    entry("DE", "Germany"),
    entry("AT", "Austria"),
    entry("CH", "Switzerland"),
    entry("GB", "United Kingdom"),
    entry("IE", "Ireland"),
    entry("FR", "France"),
    entry("ES", "Spain"),
    entry("IT", "Italy"),
    entry("PT", "Portugal"),
    entry("NL", "Netherlands"),
    entry("BE", "Belgium"),
    entry("PL", "Poland"),
    entry("CZ", "Czechia"),
    entry("HU", "Hungary"),
    entry("SE", "Sweden"),
    entry("NO", "Norway"),
    entry("FI", "Finland"),
    entry("DK", "Denmark"),
    entry("GR", "Greece"),
    entry("BG", "Bulgaria"),
    entry("MD", "Moldova"),
    entry("CA", "Canada"),
    entry("US", "United States"),
    entry("BR", "Brazil"),
    entry("MX", "Mexico"),
    entry("AU", "Australia"),
    entry("NZ", "New Zealand"),
    entry("IN", "India"),
    entry("JP", "Japan"),
];

pub const CURRENCIES: &[Entry] = &[
    entry("EUR", "Euro"),
    entry("USD", "US Dollar"),
    entry("GBP", "Pound Sterling"),
    entry("RON", "Romanian Leu"),
    entry("CHF", "Swiss Franc"),
    entry("PLN", "Polish Zloty"),
    entry("CZK", "Czech Koruna"),
    entry("HUF", "Hungarian Forint"),
    entry("SEK", "Swedish Krona"),
    entry("NOK", "Norwegian Krone"),
    entry("DKK", "Danish Krone"),
    entry("CAD", "Canadian Dollar"),
    entry("AUD", "Australian Dollar"),
    entry("NZD", "New Zealand Dollar"),
    entry("BRL", "Brazilian Real"),
    entry("BTC", "Bitcoin"),
    entry("ETH", "Ether"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    PaymentMethods,
    GameTypes,
    Countries,
    Currencies,
}

impl Registry {
    #[must_use]
    pub const fn entries(self) -> &'static [Entry] {
        match self {
            Self::PaymentMethods => PAYMENT_METHODS,
            Self::GameTypes => GAME_TYPES,
            Self::Countries => COUNTRIES,
            Self::Currencies => CURRENCIES,
        }
    }

    #[must_use]
    pub fn contains(self, code: &str) -> bool {
        self.entries().iter().any(|e| e.code == code)
    }

    /// Returns an error naming every code not in the table.
    pub fn check_codes(self, field: &str, codes: &[String]) -> Result<(), String> {
        let unknown: Vec<&str> = codes
            .iter()
            .map(String::as_str)
            .filter(|c| !self.contains(c))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(format!("{field} has unknown codes: {}", unknown.join(", ")))
        }
    }
}

/// All tables, in the shape served by the registries endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registries {
    pub payment_methods: &'static [Entry],
    pub game_types: &'static [Entry],
    pub countries: &'static [Entry],
    pub currencies: &'static [Entry],
}

#[must_use]
pub const fn all() -> Registries {
    Registries {
        payment_methods: PAYMENT_METHODS,
        game_types: GAME_TYPES,
        countries: COUNTRIES,
        currencies: CURRENCIES,
    }
}
