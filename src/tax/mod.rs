pub mod calculator;
pub mod deductions;
pub mod input;
pub mod itr;
pub mod slabs;

pub use calculator::{calculate_tax, slab_breakdown, SlabContribution, TaxResult};
pub use deductions::{
    parse_identified, total_deductions, validate_deductions, Deduction, DeductionError,
    DeductionRecord, DeductionSection,
};
pub use input::{TaxInput, TaxInputError};
pub use itr::{assessment_year, IncomeDetails, ItrForm};
pub use slabs::{
    validate_slabs, SlabConfig, SlabError, SlabRegistry, SlabTable, TaxError, TaxSlab,
    DEFAULT_COUNTRY, DEFAULT_FISCAL_YEAR,
};
