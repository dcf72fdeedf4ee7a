//! Built-in leaf rules.
//!
//! Every rule follows the same contract: guard on the value kind it
//! understands, report through the field context on failure, and reserve
//! the `Result` return for contract errors.

mod array;
mod boolean;
mod date;
mod misc;
mod number;
mod string;

pub use array::{ArrayMaxLengthRule, ArrayMinLengthRule, DistinctRule, NotEmptyRule};
pub use boolean::BooleanRule;
pub use date::{AfterRule, BeforeRule, DateRule};
pub use misc::{AcceptedRule, ArrayRule, EnumRule, LiteralRule, ObjectRule};
pub use number::{
    DecimalRule, IntegerRule, MaxRule, MinRule, NegativeRule, NumberRule, PositiveRule, RangeRule,
};
pub use string::{
    ConfirmedRule, EmailRule, EndsWithRule, FixedLengthRule, LowercaseRule, MaxLengthRule,
    MinLengthRule, RegexRule, StartsWithRule, StringRule, TrimRule, UrlRule, UuidRule,
};
