use tipjar_types::{
    AccountId, Amount, BlockWindow, ContentDigest, TipAccount, TipJarEvent, TipKey, Timestamp,
};

use crate::catalog::InvocationCatalog;
use crate::journal::EventJournal;
use crate::lock::WithdrawalLock;
use crate::tips::TipLedger;

/// Inverse of one applied mutation.
#[derive(Debug)]
pub(crate) enum Undo {
    ContentInserted(ContentDigest),
    Account(TipKey, Option<TipAccount>),
    Contribution(AccountId, TipKey, Option<Amount>),
    Window(TipKey, Option<BlockWindow>),
    EventAppended,
}

/// Mutations applied since the outermost open operation began, newest last.
#[derive(Debug, Default)]
pub(crate) struct UndoLog {
    entries: Vec<Undo>,
}

impl UndoLog {
    pub fn push(&mut self, undo: Undo) {
        self.entries.push(undo);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn pop(&mut self) -> Option<Undo> {
        self.entries.pop()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Everything the ledger owns. Guarded by the ledger's reentrant lock.
#[derive(Debug, Default)]
pub(crate) struct LedgerState {
    pub catalog: InvocationCatalog,
    pub tips: TipLedger,
    pub locks: WithdrawalLock,
    pub journal: EventJournal,
    pub undo: UndoLog,
    depth: usize,
}

impl LedgerState {
    /// Open an operation. Returns the checkpoint to roll back to on failure.
    pub fn begin(&mut self) -> usize {
        self.depth += 1;
        self.undo.len()
    }

    /// Close an operation successfully. The undo log is only discarded when the
    /// outermost operation commits; an enclosing operation may still fail.
    pub fn commit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.undo.clear();
        }
    }

    /// Close an operation by reverting every mutation made after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: usize) {
        while self.undo.len() > checkpoint {
            match self.undo.pop() {
                Some(undo) => self.revert(undo),
                None => break,
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn emit(&mut self, at: Timestamp, event: TipJarEvent) {
        self.journal.append(at, event);
        self.undo.push(Undo::EventAppended);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::ContentInserted(digest) => self.catalog.remove(&digest),
            Undo::Account(key, previous) => self.tips.restore_account(key, previous),
            Undo::Contribution(tipper, key, previous) => {
                self.tips.restore_contribution(tipper, key, previous)
            }
            Undo::Window(key, previous) => self.locks.restore(key, previous),
            Undo::EventAppended => self.journal.pop(),
        }
    }
}
