use crate::arbiter::{ArbiterState, RoundRobinArbiter};
use crate::decoder::{AddressDecoder, AddressPredicate, Decoded, TargetId};
use crate::error::{BusConfigError, BusError};
use crate::slave::{SlavePort, SlaveReply};
use crate::transaction::{BusFault, MasterId, Response, ResponseStatus, Transaction};

#[derive(Debug, Default)]
struct MasterPort {
    name: String,
    request: Option<Transaction>,
    response: Option<Response>,
}

struct SlaveEntry {
    name: String,
    port: Box<dyn SlavePort>,
}

/// Collects masters and slaves before the decode table is frozen.
#[derive(Default)]
pub struct InterconnectBuilder {
    masters: Vec<String>,
    slaves: Vec<(String, AddressPredicate, Box<dyn SlavePort>)>,
    registered: bool,
}

impl InterconnectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a master port. Ids are handed out in call order.
    pub fn master(&mut self, name: impl Into<String>) -> MasterId {
        self.masters.push(name.into());
        MasterId(self.masters.len() - 1)
    }

    /// Add a slave at the lowest decode priority.
    pub fn slave(
        &mut self,
        name: impl Into<String>,
        predicate: AddressPredicate,
        port: Box<dyn SlavePort>,
    ) -> TargetId {
        self.slaves.push((name.into(), predicate, port));
        TargetId(self.slaves.len() - 1)
    }

    /// Insert a pipeline register between arbitration and decode (one extra cycle per access).
    pub fn registered(&mut self, registered: bool) -> &mut Self {
        self.registered = registered;
        self
    }

    pub fn build(self) -> Result<SharedInterconnect, BusConfigError> {
        if self.masters.is_empty() {
            return Err(BusConfigError::NoMasters);
        }
        if self.slaves.is_empty() {
            return Err(BusConfigError::NoSlaves);
        }

        let mut masters: Vec<MasterPort> = Vec::with_capacity(self.masters.len());
        for name in self.masters {
            if masters.iter().any(|m| m.name == name) {
                return Err(BusConfigError::DuplicateMaster(name));
            }
            masters.push(MasterPort {
                name,
                ..Default::default()
            });
        }

        let mut decoder = AddressDecoder::new();
        let mut slaves: Vec<SlaveEntry> = Vec::with_capacity(self.slaves.len());
        for (idx, (name, predicate, port)) in self.slaves.into_iter().enumerate() {
            if slaves.iter().any(|s| s.name == name) {
                return Err(BusConfigError::DuplicateSlave(name));
            }
            decoder
                .push(predicate, TargetId(idx))
                .map_err(|err| match err {
                    BusConfigError::ShadowedPredicate { shadowed_by, .. } => {
                        BusConfigError::ShadowedSlave {
                            name: name.clone(),
                            shadowed_by: slaves[shadowed_by.0].name.clone(),
                        }
                    }
                    other => other,
                })?;
            tracing::debug!(slave = %name, %predicate, "mapped slave");
            slaves.push(SlaveEntry { name, port });
        }

        Ok(SharedInterconnect {
            arbiter: RoundRobinArbiter::new(masters.len()),
            masters,
            decoder,
            slaves,
            registered: self.registered,
            latch: None,
            cycle: 0,
        })
    }
}

/// Shared bus: N masters, M slaves, one transaction in flight.
///
/// Timing, per call to [`SharedInterconnect::tick`]:
/// - combinational: arbitration, decode and the first slave access share a cycle, so a slave that
///   never stalls completes a transaction in the cycle it is granted;
/// - registered: the granted request is latched in the grant cycle and decoded in the next one.
///
/// Unmapped addresses complete with [`BusFault::Unmapped`] in the cycle they are decoded.
pub struct SharedInterconnect {
    masters: Vec<MasterPort>,
    arbiter: RoundRobinArbiter,
    decoder: AddressDecoder,
    slaves: Vec<SlaveEntry>,
    registered: bool,
    latch: Option<Transaction>,
    cycle: u64,
}

impl SharedInterconnect {
    pub fn builder() -> InterconnectBuilder {
        InterconnectBuilder::new()
    }

    fn port(&self, master: MasterId) -> Result<&MasterPort, BusError> {
        self.masters
            .get(master.0)
            .ok_or(BusError::UnknownMaster(master))
    }

    fn port_mut(&mut self, master: MasterId) -> Result<&mut MasterPort, BusError> {
        self.masters
            .get_mut(master.0)
            .ok_or(BusError::UnknownMaster(master))
    }

    /// Queue `txn` on the port named by `txn.master`.
    ///
    /// A master may have one transaction outstanding; that includes a completed response it has
    /// not collected yet.
    pub fn submit(&mut self, txn: Transaction) -> Result<(), BusError> {
        let port = self.port_mut(txn.master)?;
        if port.request.is_some() || port.response.is_some() {
            return Err(BusError::MasterBusy(txn.master));
        }
        port.request = Some(txn);
        Ok(())
    }

    pub fn is_pending(&self, master: MasterId) -> bool {
        self.port(master).is_ok_and(|p| p.request.is_some())
    }

    /// Collect the response for `master`'s last transaction, if it has completed.
    pub fn take_response(&mut self, master: MasterId) -> Option<Response> {
        self.port_mut(master).ok()?.response.take()
    }

    /// Advance one clock. Returns the response completed in this cycle, if any.
    pub fn tick(&mut self) -> Option<Response> {
        self.cycle += 1;

        let master = match self.arbiter.state() {
            ArbiterState::Granted(master) => master,
            ArbiterState::Idle => {
                let masters = &self.masters;
                match self.arbiter.arbitrate(|m| masters[m.0].request.is_some()) {
                    ArbiterState::Idle => return None,
                    ArbiterState::Granted(master) => {
                        tracing::trace!(cycle = self.cycle, %master, "bus granted");
                        master
                    }
                }
            }
        };

        let Some(request) = self.masters[master.0].request else {
            // A grant is only ever given to a master with a request, and the request is only
            // cleared on completion together with the grant.
            self.arbiter.release(master);
            return None;
        };

        let txn = if self.registered {
            match self.latch {
                Some(latched) => latched,
                None => {
                    self.latch = Some(request);
                    return None;
                }
            }
        } else {
            request
        };

        let (read_data, status) = match self.decoder.decode(txn.address) {
            Decoded::Unmapped => {
                tracing::debug!(
                    cycle = self.cycle,
                    %master,
                    address = txn.address,
                    "unmapped bus access"
                );
                (0, ResponseStatus::Error(BusFault::Unmapped))
            }
            Decoded::Target(target) => match self.slaves[target.0].port.access(&txn) {
                SlaveReply::Stall => {
                    tracing::trace!(
                        cycle = self.cycle,
                        %master,
                        slave = %self.slaves[target.0].name,
                        "slave stalled"
                    );
                    return None;
                }
                SlaveReply::Ack(data) => {
                    let data = if txn.is_write { 0 } else { data };
                    (data, ResponseStatus::Ack)
                }
                SlaveReply::Error => (0, ResponseStatus::Error(BusFault::Slave)),
            },
        };

        let response = Response {
            master,
            read_data,
            status,
        };
        let port = &mut self.masters[master.0];
        port.request = None;
        port.response = Some(response);
        self.latch = None;
        self.arbiter.release(master);
        Some(response)
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn arbiter_state(&self) -> ArbiterState {
        self.arbiter.state()
    }

    pub fn granted(&self) -> Option<MasterId> {
        self.arbiter.granted()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    pub fn master_count(&self) -> usize {
        self.masters.len()
    }

    pub fn master_id(&self, name: &str) -> Option<MasterId> {
        self.masters
            .iter()
            .position(|m| m.name == name)
            .map(MasterId)
    }

    pub fn master_name(&self, master: MasterId) -> Option<&str> {
        self.port(master).ok().map(|p| p.name.as_str())
    }

    pub fn target_id(&self, name: &str) -> Option<TargetId> {
        self.slaves
            .iter()
            .position(|s| s.name == name)
            .map(TargetId)
    }

    pub fn slave_name(&self, target: TargetId) -> Option<&str> {
        self.slaves.get(target.0).map(|s| s.name.as_str())
    }

    /// Drop all queued requests and responses and reset every slave.
    pub fn reset(&mut self) {
        for port in &mut self.masters {
            port.request = None;
            port.response = None;
        }
        for slave in &mut self.slaves {
            slave.port.reset();
        }
        self.arbiter.reset();
        self.latch = None;
        self.cycle = 0;
    }
}
