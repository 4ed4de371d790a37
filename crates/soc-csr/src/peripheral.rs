use std::cell::RefCell;
use std::rc::Rc;

use crate::bank::CsrBank;

/// A peripheral that owns one CSR bank.
pub trait CsrPeripheral {
    /// Name used for bank allocation and header symbols.
    fn name(&self) -> &str;

    fn bank(&self) -> &CsrBank;

    fn bank_mut(&mut self) -> &mut CsrBank;

    /// Advance the peripheral by one clock.
    ///
    /// Runs after the bus has settled for the cycle, so strobes raised by this cycle's register
    /// writes are visible. The strobes are cleared once every peripheral has ticked.
    fn tick(&mut self) {}

    /// Reset the peripheral back to its power-on state.
    fn reset(&mut self) {}

    /// The interrupt output, if the peripheral has one.
    fn as_interrupt_source(&self) -> Option<&dyn InterruptSource> {
        None
    }
}

/// Level-sensitive interrupt output.
pub trait InterruptSource {
    fn irq(&self) -> bool;
}

pub type SharedPeripheral = Rc<RefCell<dyn CsrPeripheral>>;
