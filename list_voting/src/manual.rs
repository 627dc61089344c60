/*!

This is the long-form manual for `list_voting` and `listcount`.

## Counting

An election fills `numChoosable` seats between competing lists. Every ballot
is cast for one list and hands out exactly `numChoosable` list votes:

* every personal vote lent to a candidate of another list gives one list vote
  to that list and one personal vote to that candidate,
* the remaining list votes go to the chosen list.

On the chosen list, a personal vote counts 1, or 2 when it is cumulated.
Candidates marked as pre-cumulated by their list receive a fixed bonus
(`preCumulateWeight`, 0.25 by default) on every ballot cast for their list.

Seats are then distributed with the highest quotient method. A list that
already won `n` seats competes with the vote number `list votes / divisor(n)`:

| election type           | divisors             |
|-------------------------|----------------------|
| `sainte_lague`          | 1, 3, 5, 7, ...      |
| `modified_sainte_lague` | 1.4, 3, 5, 7, ...    |

Within each list, the seats go to the candidates with the most personal votes.
Equal personal votes are decided by the order of the candidates on the list.

## Ties

When more lists share the highest vote number than there are seats left, the
outcome depends on the order in which these lists are served. By default the
count stops and reports the tied lists with their vote numbers
(`tiebreakMode: "requireDraw"`), so that the draw can be organized by the
election officials.

With `tiebreakMode: "seededDraw"` and a `randomSeed`, the tied lists are
ordered by the SHA-256 digest of the seed, the seat number and the list id.
The draw is reproducible from the seed and is flagged in the seat log.

## Quotas

`quotaRule` selects a minimum-representation rule. The only rule currently
registered is `gender_40`: with 2 or 3 seats, at least one seat per gender;
from 4 seats, at least 40% (rounded up). The gender comes from the `gender`
field of the candidates. Quotas are reported in the summary, they do not
change the allocation.

## Configuration

```text
{
  "outputSettings": { "contestName": "Board 2024" },
  "election": { "id": "board", "type": "sainte_lague", "numChoosable": 3 },
  "rules": { "tiebreakMode": "requireDraw", "quotaRule": "gender_40" },
  "pollbooks": [ { "id": "staff" } ],
  "lists": [
    { "id": "A", "candidates": [ { "id": "a1", "gender": "female" }, { "id": "a2", "preCumulated": true } ] },
    { "id": "B", "candidates": [ { "id": "b1" } ] }
  ],
  "ballots": [
    { "chosenList": "A", "personalVotesSame": [ { "candidate": "a1", "cumulated": true } ] },
    { "chosenList": "B", "personalVotesOther": [ { "candidate": "a2", "list": "A" } ], "pollbook": "staff" }
  ],
  "ballotSources": [ { "provider": "jsonl", "filePath": "more_ballots.jsonl" } ]
}
```

Ballots can be given inline, in external files, or both. The `json` provider
reads an array of ballots, the `jsonl` provider one ballot per line. Paths are
relative to the configuration file.

 */
