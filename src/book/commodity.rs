/// A currency or tradable security unit in which balances are denominated.
#[derive(Debug, Clone, PartialEq)]
pub struct Commodity {
    /// Human-readable name, e.g. "Canadian Dollar".
    pub fullname: String,

    /// Short code, e.g. "CAD". Unique within a book's commodity table.
    pub mnemonic: String,

    /// Smallest representable unit, as a denominator: 100 means the
    /// commodity is tracked to the cent. Always a power of 10.
    pub fraction: i128,
}
