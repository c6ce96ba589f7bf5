//! Calendar date label composition
//!
//! Turns a date into the fixed sequence of letters rendered over the picture:
//!
//! ```text
//! YYYY年MM月DD日(曜)
//! ```
//!
//! and picks the ink from the weekday: red on Sunday, blue on Saturday, black
//! otherwise.
//!
//! ## Example
//!
//! ```
//! use acep_calendar::{Color, Date, DateLabel, Letter, Weekday};
//!
//! let label = DateLabel::compose(Date::new(2024, 2, 29));
//! assert_eq!(label.weekday(), Weekday::Thursday);
//! assert_eq!(label.ink(), Color::Black);
//! assert_eq!(label.letters()[4], Letter::Year);
//! ```

use crate::color::Color;

/// Number of letters in a date label
pub const LABEL_LEN: usize = 14;

/// Day of the week
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Weekday {
    /// 日
    Sunday = 0,
    /// 月
    Monday = 1,
    /// 火
    Tuesday = 2,
    /// 水
    Wednesday = 3,
    /// 木
    Thursday = 4,
    /// 金
    Friday = 5,
    /// 土
    Saturday = 6,
}

impl Weekday {
    const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Weekday for a number of days after Sunday (taken modulo 7)
    pub fn from_sunday_offset(days: u8) -> Self {
        Self::ALL[(days % 7) as usize]
    }

    /// Days since Sunday
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Label ink for this weekday
    pub fn ink(self) -> Color {
        match self {
            Self::Sunday => Color::Red,
            Self::Saturday => Color::Blue,
            _ => Color::Black,
        }
    }
}

/// Calendar date as stored by the clock
///
/// No range validation is performed: February 30th is accepted and simply
/// rendered as written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Date {
    /// Year, rendered with four digits
    pub year: u16,
    /// Month, 1-12
    pub month: u8,
    /// Day of month, 1-31
    pub day: u8,
}

impl Date {
    /// Create a date
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Day of the week in the proleptic Gregorian calendar
    ///
    /// January and February count as months 13 and 14 of the previous year.
    ///
    /// ```
    /// use acep_calendar::{Date, Weekday};
    ///
    /// assert_eq!(Date::new(2000, 1, 1).weekday(), Weekday::Saturday);
    /// ```
    pub fn weekday(&self) -> Weekday {
        let (mut year, mut month) = (i32::from(self.year), i32::from(self.month));
        if month < 3 {
            year -= 1;
            month += 12;
        }
        let days = year + year.div_euclid(4) - year.div_euclid(100)
            + year.div_euclid(400)
            + (13 * month + 8).div_euclid(5)
            + i32::from(self.day);
        Weekday::from_sunday_offset(days.rem_euclid(7) as u8)
    }
}

/// One renderable symbol of the date label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Letter {
    /// Nothing drawn, the picture shows through
    Blank,
    /// Decimal digit 0-9
    Digit(u8),
    /// Weekday kanji
    Weekday(Weekday),
    /// 年
    Year,
    /// 月
    Month,
    /// 日
    Day,
    /// (
    OpenBracket,
    /// )
    CloseBracket,
}

/// A composed date label and its ink
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateLabel {
    letters: [Letter; LABEL_LEN],
    weekday: Weekday,
}

impl DateLabel {
    /// Compose the label for `date`
    ///
    /// Year, month and day are written right-aligned in four, two and two digit
    /// slots. Slots left of the most significant digit are blank, so May
    /// renders as ` 5` while October renders as `10`.
    pub fn compose(date: Date) -> Self {
        let weekday = date.weekday();
        let mut letters = [Letter::Blank; LABEL_LEN];
        place_digits(&mut letters[0..4], date.year);
        letters[4] = Letter::Year;
        place_digits(&mut letters[5..7], u16::from(date.month));
        letters[7] = Letter::Month;
        place_digits(&mut letters[8..10], u16::from(date.day));
        letters[10] = Letter::Day;
        letters[11] = Letter::OpenBracket;
        letters[12] = Letter::Weekday(weekday);
        letters[13] = Letter::CloseBracket;
        Self { letters, weekday }
    }

    /// Create a label from arbitrary letters
    ///
    /// The weekday only decides the ink.
    pub const fn from_letters(letters: [Letter; LABEL_LEN], weekday: Weekday) -> Self {
        Self { letters, weekday }
    }

    /// Letters from left to right
    pub fn letters(&self) -> &[Letter; LABEL_LEN] {
        &self.letters
    }

    /// Weekday of the composed date
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Ink for the glyphs
    pub fn ink(&self) -> Color {
        self.weekday.ink()
    }
}

/// Write `number` right-aligned into `slots`
///
/// The units digit is always written. Higher slots are blank once the
/// remaining number is zero. Digits beyond the slot count are dropped.
fn place_digits(slots: &mut [Letter], mut number: u16) {
    for (i, slot) in slots.iter_mut().rev().enumerate() {
        *slot = if i > 0 && number == 0 {
            Letter::Blank
        } else {
            Letter::Digit((number % 10) as u8)
        };
        number /= 10;
    }
}
