use cosmwasm_schema::cw_serde;

use crate::types::ProposalOutcome;

/// Vote counts for one proposal against the number of eligible voters.
///
/// Policy: simple majority of the eligible set decides early; otherwise the
/// proposal stays open until its deadline, after which it passes only if
/// yes votes strictly outnumber no votes. Ties (including no votes at all)
/// are rejected.
#[cw_serde]
#[derive(Copy)]
pub struct Tally {
    pub yes: u32,
    pub no: u32,
    pub eligible: u32,
}

impl Tally {
    pub fn new(yes: usize, no: usize, eligible: u32) -> Self {
        Self {
            yes: yes as u32,
            no: no as u32,
            eligible,
        }
    }

    /// Outstanding voters who have not cast a vote yet.
    pub fn remaining(&self) -> u32 {
        self.eligible.saturating_sub(self.yes + self.no)
    }

    pub fn outcome(&self, deadline_passed: bool) -> ProposalOutcome {
        let yes = u64::from(self.yes);
        let no = u64::from(self.no);
        let eligible = u64::from(self.eligible);

        if eligible > 0 {
            // More than half of all eligible voters said yes; nothing can overturn it.
            if yes * 2 > eligible {
                return ProposalOutcome::Passed;
            }
            // Yes can reach at most `eligible - no`, which no longer beats `no`.
            if no * 2 >= eligible {
                return ProposalOutcome::Rejected;
            }
        }

        if deadline_passed {
            if yes > no {
                ProposalOutcome::Passed
            } else {
                ProposalOutcome::Rejected
            }
        } else {
            ProposalOutcome::Pending
        }
    }
}
