//! An instrumented in-memory driver that records every call.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sqlx_named_exec::{Binding, Connection, DriverError, Statement, Value};

#[derive(Debug, Default)]
pub struct Calls {
    pub prepared: Vec<String>,
    pub set_parameter: Vec<(usize, Binding)>,
    pub execute_update: usize,
    pub add_batch: usize,
    pub execute_batch: usize,
    pub statement_close: usize,
    pub connection_close: usize,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub prepare: bool,
    pub execute: bool,
    pub add_batch: bool,
    pub close_statement: bool,
    pub close_connection: bool,
}

/// Affected-row count reported for one row: its first integer parameter, or 1.
fn echo_first_int(row: &[Binding]) -> u64 {
    match row.first() {
        Some(Binding::Value(Value::Int(n))) => u64::try_from(*n).unwrap_or(0),
        _ => 1,
    }
}

pub struct FakeConnection {
    pub calls: Rc<RefCell<Calls>>,
    pub fail: Failures,
    pub echo_counts: bool,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self {
            calls: Rc::default(),
            fail: Failures::default(),
            echo_counts: false,
        }
    }

    pub fn failing(fail: Failures) -> Self {
        Self {
            fail,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Rc<RefCell<Calls>> {
        Rc::clone(&self.calls)
    }
}

impl Connection for FakeConnection {
    type Statement = FakeStatement;

    fn prepare(&mut self, sql: &str) -> Result<FakeStatement, DriverError> {
        self.calls.borrow_mut().prepared.push(sql.to_owned());
        if self.fail.prepare {
            return Err(DriverError::new("syntax error near VALUES").with_sql_state("42000"));
        }
        Ok(FakeStatement {
            calls: Rc::clone(&self.calls),
            fail: self.fail,
            echo_counts: self.echo_counts,
            params: Vec::new(),
            batch: Vec::new(),
        })
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.calls.borrow_mut().connection_close += 1;
        if self.fail.close_connection {
            return Err(DriverError::new("connection reset"));
        }
        Ok(())
    }
}

pub struct FakeStatement {
    calls: Rc<RefCell<Calls>>,
    fail: Failures,
    echo_counts: bool,
    params: Vec<Option<Binding>>,
    batch: Vec<Vec<Binding>>,
}

impl FakeStatement {
    fn row(&self) -> Result<Vec<Binding>, DriverError> {
        self.params
            .iter()
            .map(|p| p.clone().ok_or_else(|| DriverError::new("parameter not set")))
            .collect()
    }

    fn count(&self, row: &[Binding]) -> u64 {
        if self.echo_counts {
            echo_first_int(row)
        } else {
            1
        }
    }
}

impl Statement for FakeStatement {
    fn set_parameter(&mut self, position: usize, binding: &Binding) -> Result<(), DriverError> {
        self.calls
            .borrow_mut()
            .set_parameter
            .push((position, binding.clone()));
        if self.params.len() < position {
            self.params.resize(position, None);
        }
        self.params[position - 1] = Some(binding.clone());
        Ok(())
    }

    fn execute_update(&mut self) -> Result<u64, DriverError> {
        self.calls.borrow_mut().execute_update += 1;
        if self.fail.execute {
            return Err(DriverError::new("Duplicate entry '1' for key 'PRIMARY'").with_sql_state("23000"));
        }
        let row = self.row()?;
        Ok(self.count(&row))
    }

    fn add_batch(&mut self) -> Result<(), DriverError> {
        self.calls.borrow_mut().add_batch += 1;
        if self.fail.add_batch {
            return Err(DriverError::new("batch buffer full"));
        }
        let row = self.row()?;
        self.batch.push(row);
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<u64>, DriverError> {
        self.calls.borrow_mut().execute_batch += 1;
        if self.fail.execute {
            return Err(DriverError::new("Deadlock found").with_sql_state("40001"));
        }
        let rows = std::mem::take(&mut self.batch);
        Ok(rows.iter().map(|row| self.count(row)).collect())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.calls.borrow_mut().statement_close += 1;
        if self.fail.close_statement {
            return Err(DriverError::new("statement already finalized"));
        }
        Ok(())
    }
}
