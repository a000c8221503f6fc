use crate::trial::{Block, Trial};

/// (digit, is_target, feedback_allowed). The target flag is authored, not
/// derived from the digits, and is also the expected response. The fourth
/// 2-back step asks for a press although its digit is not a 2-back match.
type Step = (u8, bool, bool);

const ONE_BACK: [Step; 6] = [
    (5, false, false),
    (3, false, true),
    (3, true, true),
    (4, false, true),
    (4, true, true),
    (2, false, true),
];

const TWO_BACK: [Step; 6] = [
    (5, false, false),
    (3, false, true),
    (5, true, true),
    (6, false, true),
    (3, true, true),
    (7, false, true),
];

fn scripted_block(n: usize, steps: &[Step]) -> Block {
    Block {
        n,
        trials: steps
            .iter()
            .map(|&(digit, is_target, feedback)| Trial::scripted(digit, is_target, is_target, feedback))
            .collect(),
        training: true,
    }
}

/// The fixed 1-back and 2-back practice blocks.
pub fn tutorial_blocks() -> Vec<Block> {
    vec![scripted_block(1, &ONE_BACK), scripted_block(2, &TWO_BACK)]
}

/// Narration for instruction page `page` (1-based).
pub fn instruction_text(page: u8) -> Option<&'static str> {
    Some(match page {
        1 => {
            "Welcome to the N-back experiment. In this task, numbers will be presented on the screen one at a time. \
             Pay attention to the numbers, and if the number on the screen is the same as the number N times before, \
             press the spacebar. Press next to view examples."
        }
        2 => {
            "This is a 1-back example. Press the SPACEBAR when the number is the same as the previous number. \
             In this sequence: 5, 3, 3 - you should press SPACE on the third number because it matches the previous number."
        }
        3 => {
            "This is a 2-back example. Press the SPACEBAR when the number is the same as the number shown two numbers ago. \
             In this sequence: 5, 3, 5 - you should press SPACE on the third number because it matches the number two positions back."
        }
        4 => {
            "For the tutorial, you will practice both 1-back and 2-back tasks. During practice, you'll get immediate feedback \
             on your responses. The tutorial includes 6 trials for each task with a mix of targets and non-targets. \
             Remember: Press SPACE only if the number matches the one shown N positions back! \
             When ready, press Start Training. If familiar with the task, you may Skip Training."
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(block: &Block) -> Vec<(u8, bool)> {
        block.trials.iter().map(|t| (t.digit, t.is_target)).collect()
    }

    #[test]
    fn blocks_follow_the_authored_script() {
        let blocks = tutorial_blocks();
        assert_eq!(blocks.iter().map(|b| b.n).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            script(&blocks[0]),
            vec![(5, false), (3, false), (3, true), (4, false), (4, true), (2, false)]
        );
        assert_eq!(
            script(&blocks[1]),
            vec![(5, false), (3, false), (5, true), (6, false), (3, true), (7, false)]
        );
        for block in &blocks {
            assert!(block.training);
            assert!(!block.trials[0].feedback_allowed());
            assert!(block.trials[1..].iter().all(|t| t.feedback_allowed()));
        }
    }

    #[test]
    fn expected_response_can_disagree_with_the_digits() {
        let two_back = &tutorial_blocks()[1];
        let odd = &two_back.trials[4];
        assert_ne!(odd.digit, two_back.trials[2].digit);
        assert_eq!(odd.score(true), Some(true));
        assert_eq!(odd.score(false), Some(false));
    }

    #[test]
    fn four_instruction_pages() {
        assert!((1..=4).all(|p| instruction_text(p).is_some()));
        assert!(instruction_text(0).is_none());
        assert!(instruction_text(5).is_none());
    }
}
