//! Booking wizard progress and the customer's choices so far.
//!
//! The wizard opens on `SelectSkip`: postcode and waste type are collected
//! on earlier pages of the funnel.

use crate::config::DEFAULT_POSTCODE;
use crate::types::DisplaySkipRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookingStep {
    Postcode,
    WasteType,
    SelectSkip,
    PermitCheck,
    ChooseDate,
    Payment,
}

impl BookingStep {
    pub const ALL: [BookingStep; 6] = [
        BookingStep::Postcode,
        BookingStep::WasteType,
        BookingStep::SelectSkip,
        BookingStep::PermitCheck,
        BookingStep::ChooseDate,
        BookingStep::Payment,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            BookingStep::Postcode => "Postcode",
            BookingStep::WasteType => "Waste Type",
            BookingStep::SelectSkip => "Select Skip",
            BookingStep::PermitCheck => "Permit Check",
            BookingStep::ChooseDate => "Choose Date",
            BookingStep::Payment => "Payment",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BookingStep::Postcode => "Enter your location",
            BookingStep::WasteType => "Select waste category",
            BookingStep::SelectSkip => "Choose container size",
            BookingStep::PermitCheck => "Verify requirements",
            BookingStep::ChooseDate => "Schedule delivery",
            BookingStep::Payment => "Complete booking",
        }
    }

    /// First word of the name, used where labels must fit a phone screen.
    pub fn short_label(&self) -> &'static str {
        let name = self.name();
        name.split(' ').next().unwrap_or(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingData {
    pub postcode: String,
    pub waste_type: String,
    pub skip_id: Option<u64>,
    pub permit_needed: bool,
    pub selected_date: String,
}

impl Default for BookingData {
    fn default() -> Self {
        Self {
            postcode: DEFAULT_POSTCODE.to_string(),
            waste_type: String::new(),
            skip_id: None,
            permit_needed: false,
            selected_date: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWizard {
    current: BookingStep,
    data: BookingData,
}

impl BookingWizard {
    pub fn new(data: BookingData) -> Self {
        Self {
            current: BookingStep::SelectSkip,
            data,
        }
    }

    pub fn current(&self) -> BookingStep {
        self.current
    }

    pub fn data(&self) -> &BookingData {
        &self.data
    }

    pub fn status(&self, step: BookingStep) -> StepStatus {
        match step.cmp(&self.current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Upcoming,
        }
    }

    /// Fraction of the progress bar to fill, `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        self.current.index() as f64 / (BookingStep::ALL.len() - 1) as f64
    }

    pub fn go_to(&mut self, step: BookingStep) {
        self.current = step;
    }

    /// Move forward one step. Returns `false` on the last step.
    pub fn advance(&mut self) -> bool {
        match BookingStep::from_index(self.current.index() + 1) {
            Some(step) => {
                self.current = step;
                true
            }
            None => false,
        }
    }

    /// Move back one step. Returns `false` on the first step.
    pub fn back(&mut self) -> bool {
        match self.current.index().checked_sub(1).and_then(BookingStep::from_index) {
            Some(step) => {
                self.current = step;
                true
            }
            None => false,
        }
    }

    /// Record the chosen skip and return it when it is in `skips`.
    pub fn select_skip<'a>(
        &mut self,
        skip_id: u64,
        skips: &'a [DisplaySkipRecord],
    ) -> Option<&'a DisplaySkipRecord> {
        self.data.skip_id = Some(skip_id);
        skips.iter().find(|skip| skip.id == skip_id)
    }

    pub fn set_postcode(&mut self, postcode: impl Into<String>) {
        self.data.postcode = postcode.into();
    }
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new(BookingData::default())
    }
}
