use std::cmp::Ordering;
use std::collections::HashMap;

use log::{debug, info, warn};

use crate::config::{SeatAward, TieBreakMode, VotingErrors};
use crate::domain::ElectionList;
use crate::quotient::{ratio, scaled, QuotientFn};

#[derive(PartialEq, Debug, Clone)]
pub struct Allocation {
    /// list id -> seats won. Every list is present.
    pub mandates: HashMap<String, u32>,
    /// The seats in the order they were awarded.
    pub seat_awards: Vec<SeatAward>,
}

// A list still competing for seats.
#[derive(PartialEq, Debug, Clone, Copy)]
struct Contender {
    list_idx: usize,
    votes: u64,
    seats: u32,
    /// votes / quotient(seats), for the logs and the seat awards.
    vote_number: f64,
}

// Exact comparison of the vote numbers, on integers.
fn compare(quotient: QuotientFn, a: &Contender, b: &Contender) -> Ordering {
    let lhs = a.votes as u128 * scaled(quotient, b.seats) as u128;
    let rhs = b.votes as u128 * scaled(quotient, a.seats) as u128;
    lhs.cmp(&rhs)
}

// Kept in increasing vote number.
type Queue = Vec<Contender>;

fn insert_sorted(queue: &mut Queue, quotient: QuotientFn, c: Contender) {
    let pos = queue.partition_point(|e| compare(quotient, e, &c) != Ordering::Greater);
    queue.insert(pos, c);
}

/// Distributes `num_mandates` seats with the highest quotient method.
///
/// Each seat goes to the list with the highest vote number, that is its list
/// votes divided by `quotient(seats already won)`. A list leaves the race once
/// all its candidates are elected. Vote numbers are compared exactly.
///
/// Lists sharing the highest vote number are only a problem when there are
/// fewer seats left than tied lists. The tie is then resolved according to
/// `tiebreak`, which by default stops the count.
pub fn allocate_seats<L: ElectionList>(
    lists: &[L],
    list_votes: &HashMap<String, u64>,
    num_mandates: u32,
    quotient: QuotientFn,
    tiebreak: TieBreakMode,
) -> Result<Allocation, VotingErrors> {
    if num_mandates == 0 {
        return Err(VotingErrors::NoSeats);
    }
    let mut mandates: HashMap<String, u32> =
        lists.iter().map(|l| (l.id().to_string(), 0)).collect();

    let mut queue: Queue = Vec::new();
    for (idx, l) in lists.iter().enumerate() {
        if l.candidates().is_empty() {
            warn!("allocate_seats: list {} has no candidate, skipping", l.id());
            continue;
        }
        let votes = list_votes.get(l.id()).copied().unwrap_or(0);
        let c = Contender {
            list_idx: idx,
            votes,
            seats: 0,
            vote_number: votes as f64 / quotient(0),
        };
        insert_sorted(&mut queue, quotient, c);
    }

    let mut seat_awards: Vec<SeatAward> = Vec::new();
    for seat in 1..=num_mandates {
        debug!("allocate_seats: seat {}: queue: {:?}", seat, queue);
        let top = match queue.last() {
            Some(c) => *c,
            None => {
                return Err(VotingErrors::InsufficientCandidates {
                    seats: num_mandates,
                    placed: seat - 1,
                });
            }
        };
        let num_tied = queue
            .iter()
            .rev()
            .take_while(|c| compare(quotient, c, &top) == Ordering::Equal)
            .count();
        let first_tied = queue.len() - num_tied;
        let remaining_seats = (num_mandates - seat + 1) as usize;

        let (pos, drawn) = if num_tied > remaining_seats {
            let mut tied: Vec<(String, f64)> = queue[first_tied..]
                .iter()
                .map(|c| {
                    let exact = c.votes as f64 / quotient(c.seats);
                    (lists[c.list_idx].id().to_string(), exact)
                })
                .collect();
            tied.sort_by(|a, b| a.0.cmp(&b.0));
            match tiebreak {
                TieBreakMode::RequireDraw => {
                    warn!("allocate_seats: seat {}: tie between {:?}", seat, tied);
                    return Err(VotingErrors::TieRequiresRandomDraw { seat, tied });
                }
                TieBreakMode::SeededDraw(seed) => {
                    let pos = draw(&queue, first_tied, lists, seed, seat);
                    info!(
                        "allocate_seats: seat {}: tie between {:?} drawn with seed {}: {}",
                        seat,
                        tied,
                        seed,
                        lists[queue[pos].list_idx].id()
                    );
                    (pos, true)
                }
            }
        } else {
            // Every tied list gets a seat in the coming rounds, the order
            // does not change the outcome. Follow the list order.
            let pos = (first_tied..queue.len())
                .min_by_key(|p| queue[*p].list_idx)
                .unwrap_or(queue.len() - 1);
            (pos, false)
        };

        let winner = queue.remove(pos);
        let list = &lists[winner.list_idx];
        let won = mandates.entry(list.id().to_string()).or_insert(0);
        *won += 1;
        let won = *won;
        info!(
            "allocate_seats: seat {} -> {} (vote number {}, {} seats)",
            seat,
            list.id(),
            winner.vote_number,
            won
        );
        seat_awards.push(SeatAward {
            seat,
            list_id: list.id().to_string(),
            vote_number: winner.vote_number,
            drawn,
        });

        if (won as usize) < list.candidates().len() {
            let next = Contender {
                seats: won,
                vote_number: winner.vote_number * ratio(quotient, won),
                ..winner
            };
            insert_sorted(&mut queue, quotient, next);
        } else {
            debug!("allocate_seats: all the candidates of {} are elected", list.id());
        }
    }

    Ok(Allocation {
        mandates,
        seat_awards,
    })
}

/// Picks one of the tied entries `queue[first_tied..]`: the one with the
/// smallest digest of the seed, the seat and the list id.
fn draw<L: ElectionList>(
    queue: &Queue,
    first_tied: usize,
    lists: &[L],
    seed: u32,
    seat: u32,
) -> usize {
    let mut keyed: Vec<(String, usize)> = (first_tied..queue.len())
        .map(|pos| {
            let list_id = lists[queue[pos].list_idx].id();
            let key = sha256::digest(format!("{:08}{:08}{}", seed, seat, list_id));
            debug!("draw: seat {} list {} key {}", seat, list_id, key);
            (key, pos)
        })
        .collect();
    keyed.sort();
    keyed[0].1
}
