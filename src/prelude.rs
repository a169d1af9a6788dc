//! Convenient glob import of the crate's most commonly used types.
pub use crate::{
    cashflows::{
        entry::{CashFlowEntry, Category},
        flow::{CashFlow, CashFlowQuery},
        item::CashFlowItem,
    },
    loan::{Installment, Loan, MoraStrategy, Settlement, SettlementAllocation},
    money::Money,
    rates::{
        enums::{DisplayStyle, Frequency, YearBasis},
        interestrate::InterestRate,
    },
    schedule::{
        entry::{PaymentSchedule, PaymentScheduleEntry},
        SchedulerKind,
    },
    tax::{
        grossup::{grossup_loan, solve_grossup},
        iof::{IofRounding, IOF},
        traits::{BaseTax, TaxInstallment, TaxResult},
    },
    time::{
        clock::{TimeContext, TimeSource},
        date::{Date, NaiveDateExt},
        dategen::DateGen,
        enums::TimeUnit,
        period::Period,
    },
    tvm::{
        discount::{present_value, present_value_of_annuity, present_value_of_perpetuity},
        irr::{internal_rate_of_return, modified_internal_rate_of_return},
    },
    utils::errors::{EngineError, Result},
    warp::Warp,
};
