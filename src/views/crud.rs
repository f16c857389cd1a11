//! Máquina de estados compartida por las pantallas CRUD
//!
//! `Browsing` → `Editing` → `Saving` → `Browsing` (o de vuelta a `Editing`
//! con el error). El borrado pasa por `Deleting`, que espera una
//! confirmación explícita antes de llamar a la API.
//!
//! Cada operación en vuelo lleva un `Ticket`. Si la pantalla cambió de estado
//! antes de que llegue la respuesta (el usuario canceló o abrió otro registro),
//! la respuesta se ignora.

use std::future::Future;

use crate::client::ClientResult;

use super::search::{filter, Searchable};
use super::{EntityForm, FormError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum CrudMode<F> {
    Browsing,
    Editing {
        record_id: Option<i32>,
        form: F,
        error: Option<String>,
    },
    Saving {
        record_id: Option<i32>,
        form: F,
        ticket: Ticket,
    },
    Deleting {
        record_id: i32,
        ticket: Option<Ticket>,
        error: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct CrudView<F> {
    mode: CrudMode<F>,
    query: String,
    next_ticket: u64,
}

impl<F: EntityForm> Default for CrudView<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: EntityForm> CrudView<F> {
    pub fn new() -> Self {
        Self {
            mode: CrudMode::Browsing,
            query: String::new(),
            next_ticket: 0,
        }
    }

    pub fn mode(&self) -> &CrudMode<F> {
        &self.mode
    }

    pub fn is_browsing(&self) -> bool {
        matches!(self.mode, CrudMode::Browsing)
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Registros visibles según la búsqueda actual
    pub fn visible<'a>(&self, records: &'a [F::Record]) -> Vec<&'a F::Record>
    where
        F::Record: Searchable,
    {
        filter(records, &self.query)
    }

    // --- Edición ---

    pub fn open_create(&mut self, form: F) {
        self.mode = CrudMode::Editing {
            record_id: None,
            form,
            error: None,
        };
    }

    pub fn open_edit(&mut self, record: &F::Record) {
        self.mode = CrudMode::Editing {
            record_id: Some(F::record_id(record)),
            form: F::from_record(record),
            error: None,
        };
    }

    pub fn form(&self) -> Option<&F> {
        match &self.mode {
            CrudMode::Editing { form, .. } | CrudMode::Saving { form, .. } => Some(form),
            _ => None,
        }
    }

    /// Sólo se puede editar el formulario mientras no hay un guardado en vuelo
    pub fn form_mut(&mut self) -> Option<&mut F> {
        match &mut self.mode {
            CrudMode::Editing { form, .. } => Some(form),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.mode {
            CrudMode::Editing { error, .. } | CrudMode::Deleting { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// Cierra el modal; una respuesta pendiente queda huérfana
    pub fn cancel(&mut self) {
        self.mode = CrudMode::Browsing;
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Valida el formulario y pasa a `Saving`.
    /// Si la validación falla el error queda visible y no hay llamada a la API.
    pub fn begin_save(&mut self) -> Result<(Ticket, Option<i32>, F::Request), FormError> {
        let (record_id, form, request) = match &mut self.mode {
            CrudMode::Editing {
                record_id,
                form,
                error,
            } => match form.to_request() {
                Ok(request) => (*record_id, form.clone(), request),
                Err(e) => {
                    *error = Some(e.message.clone());
                    return Err(e);
                }
            },
            _ => return Err(FormError::new("Nothing to save.")),
        };

        let ticket = self.issue_ticket();
        self.mode = CrudMode::Saving {
            record_id,
            form,
            ticket,
        };
        Ok((ticket, record_id, request))
    }

    /// Aplica la respuesta de un guardado. Devuelve false si era de un ticket viejo.
    pub fn finish_save<T>(&mut self, ticket: Ticket, result: &ClientResult<T>) -> bool {
        let (record_id, form) = match &self.mode {
            CrudMode::Saving {
                ticket: current,
                record_id,
                form,
            } if *current == ticket => (*record_id, form.clone()),
            _ => {
                log::debug!("⏭️ Respuesta de guardado descartada");
                return false;
            }
        };

        self.mode = match result {
            Ok(_) => CrudMode::Browsing,
            Err(e) => CrudMode::Editing {
                record_id,
                form,
                error: Some(e.user_message()),
            },
        };
        true
    }

    /// Guarda con la llamada dada: `call(record_id, request)`
    pub async fn save_with<T, C, Fut>(&mut self, call: C) -> ClientResult<T>
    where
        C: FnOnce(Option<i32>, F::Request) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let (ticket, record_id, request) = self.begin_save()?;
        let result = call(record_id, request).await;
        self.finish_save(ticket, &result);
        result
    }

    // --- Borrado ---

    pub fn request_delete(&mut self, record_id: i32) {
        self.mode = CrudMode::Deleting {
            record_id,
            ticket: None,
            error: None,
        };
    }

    pub fn delete_prompt(&self) -> Option<&'static str> {
        match self.mode {
            CrudMode::Deleting { .. } => Some(F::DELETE_PROMPT),
            _ => None,
        }
    }

    /// Confirma el borrado pendiente; None si no había nada que confirmar
    pub fn confirm_delete(&mut self) -> Option<(Ticket, i32)> {
        let record_id = match self.mode {
            CrudMode::Deleting {
                record_id,
                ticket: None,
                ..
            } => record_id,
            _ => return None,
        };
        let ticket = self.issue_ticket();
        self.mode = CrudMode::Deleting {
            record_id,
            ticket: Some(ticket),
            error: None,
        };
        Some((ticket, record_id))
    }

    pub fn finish_delete<T>(&mut self, ticket: Ticket, result: &ClientResult<T>) -> bool {
        let record_id = match self.mode {
            CrudMode::Deleting {
                record_id,
                ticket: Some(current),
                ..
            } if current == ticket => record_id,
            _ => return false,
        };

        self.mode = match result {
            Ok(_) => CrudMode::Browsing,
            Err(e) => CrudMode::Deleting {
                record_id,
                ticket: None,
                error: Some(e.user_message()),
            },
        };
        true
    }

    pub async fn delete_with<T, C, Fut>(&mut self, call: C) -> ClientResult<Option<T>>
    where
        C: FnOnce(i32) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let Some((ticket, record_id)) = self.confirm_delete() else {
            return Ok(None);
        };
        let result = call(record_id).await;
        self.finish_delete(ticket, &result);
        result.map(Some)
    }
}
