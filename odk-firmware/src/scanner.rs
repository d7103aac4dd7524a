use crate::board::Board;

/// Walks the matrix one column per tick.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scanner {
    columns: u8,
    /// The column that the next tick activates.
    column: u8,
}

impl Scanner {
    pub fn new(columns: u8) -> Self {
        Self {
            columns: columns.max(1),
            column: 0,
        }
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    /// Switch every LED row off, then activate the next column. Returns the column now active.
    pub fn next_column<B: Board>(&mut self, board: &mut B) -> u8 {
        board.led_rows_off();
        if self.column >= self.columns {
            self.column = 0;
        }
        let active = self.column;
        board.activate_column(active);
        self.column += 1;
        active
    }

    /// The column whose rows were latched by the last [Self::next_column].
    pub fn active_column(&self) -> u8 {
        (self.column + self.columns - 1) % self.columns
    }
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod test;
