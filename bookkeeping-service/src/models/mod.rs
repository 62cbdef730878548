//! Typed records for the bookkeeping domain.

pub mod account;
pub mod invoice;
pub mod report;
pub mod transaction;
pub mod user;

pub use account::{Account, AccountDetail, AccountSummary, AccountType, CreateAccount};
pub use invoice::{
    CreateInvoice, CreateInvoiceItem, Invoice, InvoiceDetail, InvoiceHistoryEntry, InvoiceItem,
    InvoiceStatus, InvoiceTotals, ListInvoicesFilter,
};
pub use report::{
    BalanceSheetReport, CashFlowReport, GeneralLedgerReport, IncomeStatementReport, Report,
    ReportType, TrialBalanceReport,
};
pub use transaction::{
    validate_journal_entries, CreateJournal, CreateTransaction, Direction, JournalEntryInput,
    ListTransactionsFilter, TransactionDetail, TransactionEntry, TransactionRow, TransactionStatus,
};
pub use user::{CreateUser, User};
