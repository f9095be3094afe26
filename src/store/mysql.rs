//! MySQL-backed store implementations. Runtime-bound queries against the
//! legacy table layout; enum columns travel as their string forms.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySql, MySqlPool, Transaction};
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveRequest, LeaveStatus, LevelStatus, RemarkAction, RemarkEntry, SyncStatus,
};
use crate::model::leave_type::LeaveType;
use crate::model::ledger::{
    LedgerAction, LedgerEntry, LedgerOutcome, LedgerTotals, Reservation, totals_from_entries,
};
use crate::store::{
    AllocationSource, EmployeeDirectory, EmployeeProfile, LeaveStore, LedgerDirective,
    LedgerStore, NewLeaveRequest, RemarkDraft, TransitionChange,
};

pub struct MysqlStore {
    pool: MySqlPool,
}

impl MysqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn parse_enum<T: FromStr>(value: &str, what: &str) -> AppResult<T> {
    T::from_str(value)
        .map_err(|_| AppError::Database(format!("unrecognized {what} value: {value}")))
}

const REQUEST_COLUMNS: &str = r#"
    leave_req_id AS id,
    leave_req_emp_id AS employee_id,
    leave_req_type AS leave_type,
    leave_req_from_dt AS from_date,
    leave_req_to_dt AS to_date,
    leave_req_reason AS reason,
    leave_req_status AS status,
    leave_req_l1_id AS l1_id,
    leave_req_l1_status AS l1_status,
    leave_req_l2_id AS l2_id,
    leave_req_l2_status AS l2_status,
    leave_req_applied_dt AS applied_date,
    sync_status,
    sync_at,
    created_at
"#;

#[derive(FromRow)]
struct RequestRow {
    id: u64,
    employee_id: u64,
    leave_type: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
    reason: String,
    status: String,
    l1_id: u64,
    l1_status: String,
    l2_id: Option<u64>,
    l2_status: String,
    applied_date: NaiveDate,
    sync_status: String,
    sync_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl RequestRow {
    fn into_model(self) -> AppResult<LeaveRequest> {
        Ok(LeaveRequest {
            id: self.id,
            employee_id: self.employee_id,
            leave_type: parse_enum::<LeaveType>(&self.leave_type, "leave type")?,
            from_date: self.from_date,
            to_date: self.to_date,
            reason: self.reason,
            status: parse_enum::<LeaveStatus>(&self.status, "status")?,
            l1_id: self.l1_id,
            l1_status: parse_enum::<LevelStatus>(&self.l1_status, "L1 status")?,
            l2_id: self.l2_id,
            l2_status: parse_enum::<LevelStatus>(&self.l2_status, "L2 status")?,
            applied_date: self.applied_date,
            sync_status: parse_enum::<SyncStatus>(&self.sync_status, "sync status")?,
            sync_at: self.sync_at,
            created_at: self.created_at,
        })
    }
}

fn rows_to_models(rows: Vec<RequestRow>) -> AppResult<Vec<LeaveRequest>> {
    rows.into_iter().map(RequestRow::into_model).collect()
}

#[derive(FromRow)]
struct LedgerRow {
    id: u64,
    employee_id: u64,
    leave_type: String,
    qty: f64,
    action: String,
    request_id: u64,
    created_at: DateTime<Utc>,
}

impl LedgerRow {
    fn into_model(self) -> AppResult<LedgerEntry> {
        Ok(LedgerEntry {
            id: self.id,
            employee_id: self.employee_id,
            leave_type: parse_enum::<LeaveType>(&self.leave_type, "leave type")?,
            qty: self.qty,
            action: parse_enum::<LedgerAction>(&self.action, "ledger action")?,
            request_id: self.request_id,
            created_at: self.created_at,
        })
    }
}

const LEDGER_COLUMNS: &str = r#"
    ll_id AS id,
    ll_emp_id AS employee_id,
    ll_leave_type AS leave_type,
    ll_qty AS qty,
    ll_action AS action,
    ll_ref_leave_req_id AS request_id,
    ll_created_at AS created_at
"#;

#[derive(FromRow)]
struct RemarkRow {
    id: u64,
    request_id: u64,
    actor_id: u64,
    actor_name: String,
    action: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl RemarkRow {
    fn into_model(self) -> AppResult<RemarkEntry> {
        Ok(RemarkEntry {
            id: self.id,
            request_id: self.request_id,
            actor_id: self.actor_id,
            actor_name: self.actor_name,
            action: parse_enum::<RemarkAction>(&self.action, "remark action")?,
            text: self.text,
            created_at: self.created_at,
        })
    }
}

async fn insert_ledger_row(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type: LeaveType,
    qty: f64,
    action: LedgerAction,
    request_id: u64,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO leave_ledger_tbl
            (ll_emp_id, ll_leave_type, ll_qty, ll_action, ll_ref_leave_req_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(leave_type.as_str())
    .bind(qty)
    .bind(action.to_string())
    .bind(request_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.last_insert_id())
}

async fn insert_remark_row(
    tx: &mut Transaction<'_, MySql>,
    request_id: u64,
    draft: &RemarkDraft,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO leave_remark_tbl
            (lr_leave_req_id, lr_actor_id, lr_actor_name, lr_action, lr_text)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(request_id)
    .bind(draft.actor_id)
    .bind(&draft.actor_name)
    .bind(draft.action.to_string())
    .bind(&draft.text)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Fold a request's ledger rows inside the transaction. Rows are locked so
/// a racing approver or sweeper serializes on the same request.
async fn reservation_in_tx(
    tx: &mut Transaction<'_, MySql>,
    request_id: u64,
) -> AppResult<Reservation> {
    let sql = format!(
        "SELECT {LEDGER_COLUMNS} FROM leave_ledger_tbl \
         WHERE ll_ref_leave_req_id = ? ORDER BY ll_id ASC FOR UPDATE"
    );
    let rows = sqlx::query_as::<_, LedgerRow>(&sql)
        .bind(request_id)
        .fetch_all(&mut **tx)
        .await?;
    let entries = rows
        .into_iter()
        .map(LedgerRow::into_model)
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Reservation::fold(entries.iter()))
}

async fn release_in_tx(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type: LeaveType,
    qty: f64,
    request_id: u64,
) -> AppResult<LedgerOutcome> {
    if !reservation_in_tx(tx, request_id).await?.can_release() {
        return Ok(LedgerOutcome::Noop);
    }
    insert_ledger_row(tx, employee_id, leave_type, qty, LedgerAction::Release, request_id).await?;
    Ok(LedgerOutcome::Applied)
}

async fn commit_in_tx(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    leave_type: LeaveType,
    qty: f64,
    request_id: u64,
) -> AppResult<LedgerOutcome> {
    if !reservation_in_tx(tx, request_id).await?.needs_commit() {
        return Ok(LedgerOutcome::Noop);
    }
    insert_ledger_row(tx, employee_id, leave_type, qty, LedgerAction::Commit, request_id).await?;
    Ok(LedgerOutcome::Applied)
}

async fn apply_directive_in_tx(
    tx: &mut Transaction<'_, MySql>,
    req: &LeaveRequest,
    directive: LedgerDirective,
) -> AppResult<()> {
    match directive {
        LedgerDirective::Release(qty) => {
            release_in_tx(tx, req.employee_id, req.leave_type, qty, req.id).await?;
        }
        LedgerDirective::Commit(qty) => {
            commit_in_tx(tx, req.employee_id, req.leave_type, qty, req.id).await?;
        }
        LedgerDirective::ReleaseThenCommit(qty) => {
            release_in_tx(tx, req.employee_id, req.leave_type, qty, req.id).await?;
            commit_in_tx(tx, req.employee_id, req.leave_type, qty, req.id).await?;
        }
    }
    Ok(())
}

#[async_trait]
impl LeaveStore for MysqlStore {
    async fn create_request(&self, draft: NewLeaveRequest) -> AppResult<LeaveRequest> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO leave_request_tbl
                (leave_req_emp_id, leave_req_type, leave_req_from_dt, leave_req_to_dt,
                 leave_req_reason, leave_req_status, leave_req_l1_id, leave_req_l1_status,
                 leave_req_l2_id, leave_req_l2_status, leave_req_applied_dt, sync_status)
            VALUES (?, ?, ?, ?, ?, 'Pending', ?, 'Pending', ?, 'Pending', ?, 'PENDING')
            "#,
        )
        .bind(draft.employee_id)
        .bind(draft.leave_type.as_str())
        .bind(draft.from_date)
        .bind(draft.to_date)
        .bind(&draft.reason)
        .bind(draft.l1_id)
        .bind(draft.l2_id)
        .bind(draft.applied_date)
        .execute(&mut *tx)
        .await?;
        let request_id = result.last_insert_id();

        insert_ledger_row(
            &mut tx,
            draft.employee_id,
            draft.leave_type,
            draft.hold_qty,
            LedgerAction::Hold,
            request_id,
        )
        .await?;
        insert_remark_row(&mut tx, request_id, &draft.remark).await?;

        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_request_tbl WHERE leave_req_id = ?");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        row.into_model()
    }

    async fn request(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM leave_request_tbl WHERE leave_req_id = ?");
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(RequestRow::into_model).transpose()
    }

    async fn requests_for_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request_tbl \
             WHERE leave_req_emp_id = ? ORDER BY leave_req_id DESC"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        rows_to_models(rows)
    }

    async fn requests_for_approver(&self, approver_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request_tbl \
             WHERE leave_req_l1_id = ? OR leave_req_l2_id = ? ORDER BY leave_req_id DESC"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(approver_id)
            .bind(approver_id)
            .fetch_all(&self.pool)
            .await?;
        rows_to_models(rows)
    }

    async fn active_overlapping(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request_tbl \
             WHERE leave_req_emp_id = ? \
               AND leave_req_status IN ('Pending', 'L1 Approved', 'Approved') \
               AND leave_req_from_dt <= ? AND leave_req_to_dt >= ?"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(employee_id)
            .bind(to)
            .bind(from)
            .fetch_all(&self.pool)
            .await?;
        rows_to_models(rows)
    }

    async fn apply_transition(
        &self,
        request_id: u64,
        change: &TransitionChange,
    ) -> AppResult<LeaveRequest> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request_tbl WHERE leave_req_id = ? FOR UPDATE"
        );
        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Leave request {request_id} not found")))?;
        let mut req = row.into_model()?;

        // The plan was derived from an earlier read; a sweeper or another
        // approver may have moved the row since.
        if req.status != change.expected_status {
            return Err(AppError::validation(format!(
                "Request was {} when planned but is now {}",
                change.expected_status, req.status
            )));
        }

        req.status = change.status;
        if let Some(l1) = change.l1_status {
            req.l1_status = l1;
        }
        if let Some(l2) = change.l2_status {
            req.l2_status = l2;
        }

        sqlx::query(
            r#"
            UPDATE leave_request_tbl
            SET leave_req_status = ?, leave_req_l1_status = ?, leave_req_l2_status = ?
            WHERE leave_req_id = ?
            "#,
        )
        .bind(req.status.to_string())
        .bind(req.l1_status.to_string())
        .bind(req.l2_status.to_string())
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        insert_remark_row(&mut tx, request_id, &change.remark).await?;
        if let Some(directive) = change.ledger {
            apply_directive_in_tx(&mut tx, &req, directive).await?;
        }

        tx.commit().await?;
        Ok(req)
    }

    async fn pending_starting_on(&self, date: NaiveDate) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request_tbl \
             WHERE leave_req_status = 'Pending' AND leave_req_from_dt = ? \
             ORDER BY leave_req_id ASC"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        rows_to_models(rows)
    }

    async fn approved_unsynced(&self, date: NaiveDate) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM leave_request_tbl \
             WHERE leave_req_status = 'Approved' AND sync_status = 'PENDING' \
               AND leave_req_from_dt = ? \
             ORDER BY leave_req_id ASC"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        rows_to_models(rows)
    }

    async fn mark_synced(&self, request_id: u64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_request_tbl
            SET sync_status = 'SYNCED', sync_at = NOW()
            WHERE leave_req_id = ? AND sync_status = 'PENDING'
            "#,
        )
        .bind(request_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        // Distinguish "already synced" from "no such request".
        if self.request(request_id).await?.is_none() {
            return Err(AppError::not_found(format!(
                "Leave request {request_id} not found"
            )));
        }
        Ok(false)
    }

    async fn remarks(&self, request_id: u64) -> AppResult<Vec<RemarkEntry>> {
        let rows = sqlx::query_as::<_, RemarkRow>(
            r#"
            SELECT lr_id AS id, lr_leave_req_id AS request_id, lr_actor_id AS actor_id,
                   lr_actor_name AS actor_name, lr_action AS action, lr_text AS text,
                   lr_created_at AS created_at
            FROM leave_remark_tbl
            WHERE lr_leave_req_id = ?
            ORDER BY lr_id ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(RemarkRow::into_model).collect()
    }
}

#[async_trait]
impl LedgerStore for MysqlStore {
    async fn hold(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerEntry> {
        let mut tx = self.pool.begin().await?;
        let id =
            insert_ledger_row(&mut tx, employee_id, leave_type, qty, LedgerAction::Hold, request_id)
                .await?;
        tx.commit().await?;
        Ok(LedgerEntry {
            id,
            employee_id,
            leave_type,
            qty,
            action: LedgerAction::Hold,
            request_id,
            created_at: Utc::now(),
        })
    }

    async fn release(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerOutcome> {
        let mut tx = self.pool.begin().await?;
        let outcome = release_in_tx(&mut tx, employee_id, leave_type, qty, request_id).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn commit(
        &self,
        employee_id: u64,
        leave_type: LeaveType,
        qty: f64,
        request_id: u64,
    ) -> AppResult<LedgerOutcome> {
        let mut tx = self.pool.begin().await?;
        let outcome = commit_in_tx(&mut tx, employee_id, leave_type, qty, request_id).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    async fn entries_for_request(&self, request_id: u64) -> AppResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM leave_ledger_tbl \
             WHERE ll_ref_leave_req_id = ? ORDER BY ll_id ASC"
        );
        let rows = sqlx::query_as::<_, LedgerRow>(&sql)
            .bind(request_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(LedgerRow::into_model).collect()
    }

    async fn totals(&self, employee_id: u64, leave_type: LeaveType) -> AppResult<LedgerTotals> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM leave_ledger_tbl \
             WHERE ll_emp_id = ? AND ll_leave_type = ? ORDER BY ll_id ASC"
        );
        let rows = sqlx::query_as::<_, LedgerRow>(&sql)
            .bind(employee_id)
            .bind(leave_type.as_str())
            .fetch_all(&self.pool)
            .await?;
        let entries = rows
            .into_iter()
            .map(LedgerRow::into_model)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(totals_from_entries(&entries))
    }
}

#[derive(FromRow)]
struct EmployeeRow {
    employee_id: u64,
    name: String,
    l1_id: Option<u64>,
    l2_id: Option<u64>,
}

#[async_trait]
impl EmployeeDirectory for MysqlStore {
    async fn profile(&self, employee_id: u64) -> AppResult<Option<EmployeeProfile>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT emp_id AS employee_id, emp_name AS name, emp_l1 AS l1_id, emp_l2 AS l2_id
            FROM employee_tbl
            WHERE emp_id = ?
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| EmployeeProfile {
            employee_id: r.employee_id,
            name: r.name,
            l1_id: r.l1_id,
            l2_id: r.l2_id,
        }))
    }
}

#[async_trait]
impl AllocationSource for MysqlStore {
    async fn allocated(&self, employee_id: u64, leave_type: LeaveType) -> AppResult<f64> {
        let allocated = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(la_allocated), 0)
            FROM leave_allocation_tbl
            WHERE la_emp_id = ? AND la_leave_type = ?
            "#,
        )
        .bind(employee_id)
        .bind(leave_type.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(allocated)
    }
}
