/// A labeled text classification item
pub trait Item {
    /// The text used as classifier input
    fn input(&self) -> &str;

    /// The class name of the text
    fn class_label(&self) -> &str;
}
