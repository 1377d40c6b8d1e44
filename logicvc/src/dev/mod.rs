// SPDX-License-Identifier: GPL-3.0-or-later

//! Register level view of the logiCVC IP core

pub mod cvc;
pub mod reg;

// eof
